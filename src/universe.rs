//! Static knowledge about the things that can appear in a DOOM or DOOM II map: how big they
//! are and which sprite draws them.  Map data only carries a type number.

bitflags! {
    pub struct ThingCategory: u8 {
        const ARTIFACT = 0x01;
        const PICKUP = 0x04;
        const WEAPON = 0x08;
        const MONSTER = 0x10;
        const OBSTACLE = 0x20;
        const SHOOTABLE = 0x40;
        const HANGS_FROM_CEILING = 0x80;
    }
}

#[derive(Debug)]
pub struct ThingType {
    pub doomednum: i16,
    pub radius: u32,
    pub height: u32,
    /// Four-letter sprite prefix
    pub sprite: Option<&'static str>,
    /// Animation frames in order, as frame letters; a trailing `+` means the frames also have
    /// rotations.  `-` for things that are never drawn.
    pub frames: &'static str,
    class: u8,
}

impl ThingType {
    pub fn category(&self) -> ThingCategory {
        ThingCategory::from_bits_truncate(self.class)
    }

    /// Player starts, teleport destinations, and the like.  Either invisible in game, or
    /// drawn with sprites that don't follow the usual naming, so they don't get a billboard.
    pub fn is_spriteless(&self) -> bool {
        match self.doomednum {
            1 | 2 | 3 | 4 | 11 | 14 | 87 | 88 | 89 => true,
            _ => false,
        }
    }

    /// Candidate lump names for the first frame, most likely first: the rotation-less form,
    /// then the first rotation.
    pub fn sprite_lump_names(&self) -> Vec<String> {
        let (prefix, frame) = match (self.sprite, self.frames.chars().next()) {
            (Some(prefix), Some(frame)) if !self.is_spriteless() && frame != '-' => (prefix, frame),
            _ => return Vec::new(),
        };
        return vec![
            format!("{}{}0", prefix, frame),
            format!("{}{}1", prefix, frame),
        ];
    }
}

const fn thing(
    doomednum: i16, radius: u32, height: u32, sprite: Option<&'static str>, frames: &'static str,
    class: u8,
) -> ThingType {
    ThingType{ doomednum, radius, height, sprite, frames, class }
}

// Raw category bits for the table below
const ARTIFACT: u8 = 0x01;
const PICKUP: u8 = 0x04;
const WEAPON: u8 = 0x08;
const MONSTER: u8 = 0x10;
const OBSTACLE: u8 = 0x20;
const SHOOTABLE: u8 = 0x40;
const HANGS_FROM_CEILING: u8 = 0x80;

pub static DOOM_THING_TYPES: [ThingType; 123] = [
    // Monsters
    thing(68, 64, 64, Some("BSPI"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(64, 20, 56, Some("VILE"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(3003, 24, 64, Some("BOSS"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(3005, 31, 54, Some("HEAD"), "A+", MONSTER | OBSTACLE | SHOOTABLE | HANGS_FROM_CEILING),
    thing(72, 16, 72, Some("KEEN"), "A+", MONSTER | OBSTACLE | SHOOTABLE | HANGS_FROM_CEILING),
    thing(16, 40, 110, Some("CYBR"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(3002, 30, 54, Some("SARG"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(65, 20, 56, Some("CPOS"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(69, 24, 64, Some("BOS2"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(3001, 20, 56, Some("TROO"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(3006, 16, 56, Some("SKUL"), "AB+", MONSTER | OBSTACLE | SHOOTABLE | HANGS_FROM_CEILING),
    thing(67, 48, 64, Some("FATT"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(71, 31, 56, Some("PAIN"), "A+", MONSTER | OBSTACLE | SHOOTABLE | HANGS_FROM_CEILING),
    thing(66, 20, 56, Some("SKEL"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(9, 20, 56, Some("SPOS"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(58, 30, 56, Some("SARG"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(7, 128, 100, Some("SPID"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(84, 20, 56, Some("SSWV"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    thing(3004, 20, 56, Some("POSS"), "AB+", MONSTER | OBSTACLE | SHOOTABLE),
    // Weapons
    thing(2006, 20, 16, Some("BFUG"), "A", WEAPON | PICKUP),
    thing(2002, 20, 16, Some("MGUN"), "A", WEAPON | PICKUP),
    thing(2005, 20, 16, Some("CSAW"), "A", WEAPON | PICKUP),
    thing(2004, 20, 16, Some("PLAS"), "A", WEAPON | PICKUP),
    thing(2003, 20, 16, Some("LAUN"), "A", WEAPON | PICKUP),
    thing(2001, 20, 16, Some("SHOT"), "A", WEAPON | PICKUP),
    thing(82, 20, 16, Some("SGN2"), "A", WEAPON | PICKUP),
    // Ammo
    thing(2008, 20, 16, Some("SHEL"), "A", PICKUP),
    thing(2048, 20, 16, Some("AMMO"), "A", PICKUP),
    thing(2046, 20, 16, Some("BROK"), "A", PICKUP),
    thing(2049, 20, 16, Some("SBOX"), "A", PICKUP),
    thing(2007, 20, 16, Some("CLIP"), "A", PICKUP),
    thing(2047, 20, 16, Some("CELL"), "A", PICKUP),
    thing(17, 20, 16, Some("CELP"), "A", PICKUP),
    thing(2010, 20, 16, Some("ROCK"), "A", PICKUP),
    // Artifacts
    thing(2015, 20, 16, Some("BON2"), "ABCDCB", ARTIFACT | PICKUP),
    thing(2023, 20, 16, Some("PSTR"), "A", ARTIFACT | PICKUP),
    thing(2026, 20, 16, Some("PMAP"), "ABCDCB", ARTIFACT | PICKUP),
    thing(2014, 20, 16, Some("BON1"), "ABCDCB", ARTIFACT | PICKUP),
    thing(2022, 20, 16, Some("PINV"), "ABCD", ARTIFACT | PICKUP),
    thing(2045, 20, 16, Some("PVIS"), "AB", ARTIFACT | PICKUP),
    thing(83, 20, 16, Some("MEGA"), "ABCD", ARTIFACT | PICKUP),
    thing(2024, 20, 16, Some("PINS"), "ABCD", ARTIFACT | PICKUP),
    thing(2013, 20, 16, Some("SOUL"), "ABCDCB", ARTIFACT | PICKUP),
    thing(2018, 20, 16, Some("ARM1"), "AB", PICKUP),
    thing(8, 20, 16, Some("BPAK"), "A", PICKUP),
    thing(2012, 20, 16, Some("MEDI"), "A", PICKUP),
    thing(2019, 20, 16, Some("ARM2"), "AB", PICKUP),
    thing(2025, 20, 16, Some("SUIT"), "A", PICKUP),
    thing(2011, 20, 16, Some("STIM"), "A", PICKUP),
    // Keys
    thing(5, 20, 16, Some("BKEY"), "AB", PICKUP),
    thing(40, 20, 16, Some("BSKU"), "AB", PICKUP),
    thing(13, 20, 16, Some("RKEY"), "AB", PICKUP),
    thing(38, 20, 16, Some("RSKU"), "AB", PICKUP),
    thing(6, 20, 16, Some("YKEY"), "AB", PICKUP),
    thing(39, 20, 16, Some("YSKU"), "AB", PICKUP),
    // Obstacles
    thing(47, 16, 16, Some("SMIT"), "A", OBSTACLE),
    thing(70, 16, 16, Some("FCAN"), "ABC", OBSTACLE),
    thing(43, 16, 16, Some("TRE1"), "A", OBSTACLE),
    thing(35, 16, 16, Some("CBRA"), "A", OBSTACLE),
    thing(41, 16, 16, Some("CEYE"), "ABCB", OBSTACLE),
    thing(2035, 16, 16, Some("BAR1"), "AB", OBSTACLE | SHOOTABLE),
    thing(28, 16, 16, Some("POL2"), "A", OBSTACLE),
    thing(42, 16, 16, Some("FSKU"), "ABC", OBSTACLE),
    thing(2028, 16, 16, Some("COLU"), "A", OBSTACLE),
    thing(53, 16, 16, Some("GOR5"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(52, 16, 16, Some("GOR4"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(78, 16, 16, Some("HDB6"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(75, 16, 16, Some("HDB3"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(77, 16, 16, Some("HDB5"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(76, 16, 16, Some("HDB4"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(50, 16, 16, Some("GOR2"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(74, 16, 16, Some("HDB2"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(73, 16, 16, Some("HDB1"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(51, 16, 16, Some("GOR3"), "A", OBSTACLE | HANGS_FROM_CEILING),
    thing(49, 16, 16, Some("GOR1"), "ABCB", OBSTACLE | HANGS_FROM_CEILING),
    thing(25, 16, 16, Some("POL1"), "A", OBSTACLE),
    thing(54, 16, 16, Some("TRE2"), "A", OBSTACLE),
    thing(29, 16, 16, Some("POL3"), "AB", OBSTACLE),
    thing(55, 16, 16, Some("SMBT"), "ABCD", OBSTACLE),
    thing(56, 16, 16, Some("SMGT"), "ABCD", OBSTACLE),
    thing(31, 16, 16, Some("COL2"), "A", OBSTACLE),
    thing(36, 16, 16, Some("COL5"), "AB", OBSTACLE),
    thing(57, 16, 16, Some("SMRT"), "ABCD", OBSTACLE),
    thing(33, 16, 16, Some("COL4"), "A", OBSTACLE),
    thing(37, 16, 16, Some("COL6"), "A", OBSTACLE),
    thing(86, 16, 16, Some("TLP2"), "ABCD", OBSTACLE),
    thing(27, 16, 16, Some("POL4"), "A", OBSTACLE),
    thing(44, 16, 16, Some("TBLU"), "ABCD", OBSTACLE),
    thing(45, 16, 16, Some("TGRN"), "ABCD", OBSTACLE),
    thing(30, 16, 16, Some("COL1"), "A", OBSTACLE),
    thing(46, 16, 16, Some("TRED"), "ABCD", OBSTACLE),
    thing(32, 16, 16, Some("COL3"), "A", OBSTACLE),
    thing(48, 16, 16, Some("ELEC"), "A", OBSTACLE),
    thing(85, 16, 16, Some("TLMP"), "ABCD", OBSTACLE),
    thing(26, 16, 16, Some("POL6"), "AB", OBSTACLE),
    // Decorations
    thing(10, 20, 16, Some("PLAY"), "W", 0),
    thing(12, 20, 16, Some("PLAY"), "W", 0),
    thing(34, 20, 16, Some("CAND"), "A", 0),
    thing(22, 20, 16, Some("HEAD"), "L", 0),
    thing(21, 20, 16, Some("SARG"), "N", 0),
    thing(18, 20, 16, Some("POSS"), "L", 0),
    thing(19, 20, 16, Some("SPOS"), "L", 0),
    thing(20, 20, 16, Some("TROO"), "M", 0),
    thing(23, 20, 16, Some("SKUL"), "K", 0),
    thing(15, 20, 16, Some("PLAY"), "N", 0),
    thing(62, 20, 52, Some("GOR5"), "A", 0),
    thing(60, 20, 68, Some("GOR4"), "A", 0),
    thing(59, 20, 84, Some("GOR2"), "A", 0),
    thing(61, 20, 52, Some("GOR3"), "A", 0),
    thing(63, 20, 68, Some("GOR1"), "ABCB", 0),
    thing(79, 20, 16, Some("POB1"), "A", 0),
    thing(80, 20, 16, Some("POB2"), "A", 0),
    thing(24, 20, 16, Some("POL5"), "A", 0),
    thing(81, 20, 16, Some("BRS1"), "A", 0),
    // Others
    thing(11, 20, 56, None, "-", 0),
    thing(89, 20, 32, None, "-", 0),
    thing(1, 16, 56, Some("PLAY"), "A+", 0),
    thing(2, 16, 56, Some("PLAY"), "A+", 0),
    thing(3, 16, 56, Some("PLAY"), "A+", 0),
    thing(4, 16, 56, Some("PLAY"), "A+", 0),
    thing(88, 16, 16, Some("BBRN"), "A+", OBSTACLE | SHOOTABLE),
    thing(87, 20, 32, None, "-", 0),
    thing(14, 20, 16, None, "-", 0),
];

pub fn lookup_thing_type(doomednum: i16) -> Option<&'static ThingType> {
    for thing_type in DOOM_THING_TYPES.iter() {
        if thing_type.doomednum == doomednum {
            return Some(thing_type);
        }
    }
    return None;
}
