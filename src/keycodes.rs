use crate::consts::{MO_BASE, PARAM_SLOTS, PF_BASE};
use crate::error::{KeymetaError, KmResult};
use crate::integer::parse_u8;
use crate::issue::{json_kind, FieldPath, Issue, IssueKind, Report, Validated};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumString, FromRepr};

/// The firmware's closed keycode table.
///
/// The `to_string` name is canonical; every `serialize` entry is an accepted alias.
/// `MO(n)` and `PF(n)` occupy `0xC0..=0xCF` and are not listed here.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumMessage, FromRepr)]
#[repr(u8)]
pub enum Keycode {
    #[strum(to_string = "KC_NO", serialize = "XXXXXXX")]
    No = 0x00,
    #[strum(to_string = "KC_TRANSPARENT", serialize = "KC_TRNS", serialize = "_______")]
    Transparent = 0x01,

    #[strum(to_string = "KC_A")] A = 0x04,
    #[strum(to_string = "KC_B")] B = 0x05,
    #[strum(to_string = "KC_C")] C = 0x06,
    #[strum(to_string = "KC_D")] D = 0x07,
    #[strum(to_string = "KC_E")] E = 0x08,
    #[strum(to_string = "KC_F")] F = 0x09,
    #[strum(to_string = "KC_G")] G = 0x0A,
    #[strum(to_string = "KC_H")] H = 0x0B,
    #[strum(to_string = "KC_I")] I = 0x0C,
    #[strum(to_string = "KC_J")] J = 0x0D,
    #[strum(to_string = "KC_K")] K = 0x0E,
    #[strum(to_string = "KC_L")] L = 0x0F,
    #[strum(to_string = "KC_M")] M = 0x10,
    #[strum(to_string = "KC_N")] N = 0x11,
    #[strum(to_string = "KC_O")] O = 0x12,
    #[strum(to_string = "KC_P")] P = 0x13,
    #[strum(to_string = "KC_Q")] Q = 0x14,
    #[strum(to_string = "KC_R")] R = 0x15,
    #[strum(to_string = "KC_S")] S = 0x16,
    #[strum(to_string = "KC_T")] T = 0x17,
    #[strum(to_string = "KC_U")] U = 0x18,
    #[strum(to_string = "KC_V")] V = 0x19,
    #[strum(to_string = "KC_W")] W = 0x1A,
    #[strum(to_string = "KC_X")] X = 0x1B,
    #[strum(to_string = "KC_Y")] Y = 0x1C,
    #[strum(to_string = "KC_Z")] Z = 0x1D,

    #[strum(to_string = "KC_1")] Kc1 = 0x1E,
    #[strum(to_string = "KC_2")] Kc2 = 0x1F,
    #[strum(to_string = "KC_3")] Kc3 = 0x20,
    #[strum(to_string = "KC_4")] Kc4 = 0x21,
    #[strum(to_string = "KC_5")] Kc5 = 0x22,
    #[strum(to_string = "KC_6")] Kc6 = 0x23,
    #[strum(to_string = "KC_7")] Kc7 = 0x24,
    #[strum(to_string = "KC_8")] Kc8 = 0x25,
    #[strum(to_string = "KC_9")] Kc9 = 0x26,
    #[strum(to_string = "KC_0")] Kc0 = 0x27,

    #[strum(to_string = "KC_ENTER", serialize = "KC_ENT")] Enter = 0x28,
    #[strum(to_string = "KC_ESCAPE", serialize = "KC_ESC")] Escape = 0x29,
    #[strum(to_string = "KC_BACKSPACE", serialize = "KC_BSPC")] Backspace = 0x2A,
    #[strum(to_string = "KC_TAB")] Tab = 0x2B,
    #[strum(to_string = "KC_SPACE", serialize = "KC_SPC")] Space = 0x2C,
    #[strum(to_string = "KC_MINUS", serialize = "KC_MINS")] Minus = 0x2D,
    #[strum(to_string = "KC_EQUAL", serialize = "KC_EQL")] Equal = 0x2E,
    #[strum(to_string = "KC_LEFT_BRACKET", serialize = "KC_LBRC")] LeftBracket = 0x2F,
    #[strum(to_string = "KC_RIGHT_BRACKET", serialize = "KC_RBRC")] RightBracket = 0x30,
    #[strum(to_string = "KC_BACKSLASH", serialize = "KC_BSLS")] Backslash = 0x31,
    #[strum(to_string = "KC_NONUS_HASH", serialize = "KC_NUHS")] NonUsHash = 0x32,
    #[strum(to_string = "KC_SEMICOLON", serialize = "KC_SCLN")] Semicolon = 0x33,
    #[strum(to_string = "KC_QUOTE", serialize = "KC_QUOT")] Quote = 0x34,
    #[strum(to_string = "KC_GRAVE", serialize = "KC_GRV")] Grave = 0x35,
    #[strum(to_string = "KC_COMMA", serialize = "KC_COMM")] Comma = 0x36,
    #[strum(to_string = "KC_DOT")] Dot = 0x37,
    #[strum(to_string = "KC_SLASH", serialize = "KC_SLSH")] Slash = 0x38,
    #[strum(to_string = "KC_CAPS_LOCK", serialize = "KC_CAPS")] CapsLock = 0x39,

    #[strum(to_string = "KC_F1")] F1 = 0x3A,
    #[strum(to_string = "KC_F2")] F2 = 0x3B,
    #[strum(to_string = "KC_F3")] F3 = 0x3C,
    #[strum(to_string = "KC_F4")] F4 = 0x3D,
    #[strum(to_string = "KC_F5")] F5 = 0x3E,
    #[strum(to_string = "KC_F6")] F6 = 0x3F,
    #[strum(to_string = "KC_F7")] F7 = 0x40,
    #[strum(to_string = "KC_F8")] F8 = 0x41,
    #[strum(to_string = "KC_F9")] F9 = 0x42,
    #[strum(to_string = "KC_F10")] F10 = 0x43,
    #[strum(to_string = "KC_F11")] F11 = 0x44,
    #[strum(to_string = "KC_F12")] F12 = 0x45,

    #[strum(to_string = "KC_PRINT_SCREEN", serialize = "KC_PSCR")] PrintScreen = 0x46,
    #[strum(to_string = "KC_SCROLL_LOCK", serialize = "KC_SCRL")] ScrollLock = 0x47,
    #[strum(to_string = "KC_PAUSE", serialize = "KC_PAUS")] Pause = 0x48,
    #[strum(to_string = "KC_INSERT", serialize = "KC_INS")] Insert = 0x49,
    #[strum(to_string = "KC_HOME")] Home = 0x4A,
    #[strum(to_string = "KC_PAGE_UP", serialize = "KC_PGUP")] PageUp = 0x4B,
    #[strum(to_string = "KC_DELETE", serialize = "KC_DEL")] Delete = 0x4C,
    #[strum(to_string = "KC_END")] End = 0x4D,
    #[strum(to_string = "KC_PAGE_DOWN", serialize = "KC_PGDN")] PageDown = 0x4E,
    #[strum(to_string = "KC_RIGHT", serialize = "KC_RGHT")] Right = 0x4F,
    #[strum(to_string = "KC_LEFT")] Left = 0x50,
    #[strum(to_string = "KC_DOWN")] Down = 0x51,
    #[strum(to_string = "KC_UP")] Up = 0x52,

    #[strum(to_string = "KC_NUM_LOCK", serialize = "KC_NUM")] NumLock = 0x53,
    #[strum(to_string = "KC_KP_SLASH", serialize = "KC_PSLS")] KpSlash = 0x54,
    #[strum(to_string = "KC_KP_ASTERISK", serialize = "KC_PAST")] KpAsterisk = 0x55,
    #[strum(to_string = "KC_KP_MINUS", serialize = "KC_PMNS")] KpMinus = 0x56,
    #[strum(to_string = "KC_KP_PLUS", serialize = "KC_PPLS")] KpPlus = 0x57,
    #[strum(to_string = "KC_KP_ENTER", serialize = "KC_PENT")] KpEnter = 0x58,
    #[strum(to_string = "KC_KP_1", serialize = "KC_P1")] Kp1 = 0x59,
    #[strum(to_string = "KC_KP_2", serialize = "KC_P2")] Kp2 = 0x5A,
    #[strum(to_string = "KC_KP_3", serialize = "KC_P3")] Kp3 = 0x5B,
    #[strum(to_string = "KC_KP_4", serialize = "KC_P4")] Kp4 = 0x5C,
    #[strum(to_string = "KC_KP_5", serialize = "KC_P5")] Kp5 = 0x5D,
    #[strum(to_string = "KC_KP_6", serialize = "KC_P6")] Kp6 = 0x5E,
    #[strum(to_string = "KC_KP_7", serialize = "KC_P7")] Kp7 = 0x5F,
    #[strum(to_string = "KC_KP_8", serialize = "KC_P8")] Kp8 = 0x60,
    #[strum(to_string = "KC_KP_9", serialize = "KC_P9")] Kp9 = 0x61,
    #[strum(to_string = "KC_KP_0", serialize = "KC_P0")] Kp0 = 0x62,
    #[strum(to_string = "KC_KP_DOT", serialize = "KC_PDOT")] KpDot = 0x63,
    #[strum(to_string = "KC_NONUS_BACKSLASH", serialize = "KC_NUBS")] NonUsBackslash = 0x64,
    #[strum(to_string = "KC_APPLICATION", serialize = "KC_APP")] Application = 0x65,
    #[strum(to_string = "KC_KB_POWER")] KbPower = 0x66,
    #[strum(to_string = "KC_KP_EQUAL", serialize = "KC_PEQL")] KpEqual = 0x67,

    #[strum(to_string = "KC_F13")] F13 = 0x68,
    #[strum(to_string = "KC_F14")] F14 = 0x69,
    #[strum(to_string = "KC_F15")] F15 = 0x6A,
    #[strum(to_string = "KC_F16")] F16 = 0x6B,
    #[strum(to_string = "KC_F17")] F17 = 0x6C,
    #[strum(to_string = "KC_F18")] F18 = 0x6D,
    #[strum(to_string = "KC_F19")] F19 = 0x6E,
    #[strum(to_string = "KC_F20")] F20 = 0x6F,
    #[strum(to_string = "KC_F21")] F21 = 0x70,
    #[strum(to_string = "KC_F22")] F22 = 0x71,
    #[strum(to_string = "KC_F23")] F23 = 0x72,
    #[strum(to_string = "KC_F24")] F24 = 0x73,

    #[strum(to_string = "KC_EXECUTE", serialize = "KC_EXEC")] Execute = 0x74,
    #[strum(to_string = "KC_HELP")] Help = 0x75,
    #[strum(to_string = "KC_MENU")] Menu = 0x76,
    #[strum(to_string = "KC_SELECT", serialize = "KC_SLCT")] Select = 0x77,
    #[strum(to_string = "KC_STOP")] Stop = 0x78,
    #[strum(to_string = "KC_AGAIN", serialize = "KC_AGIN")] Again = 0x79,
    #[strum(to_string = "KC_UNDO")] Undo = 0x7A,
    #[strum(to_string = "KC_CUT")] Cut = 0x7B,
    #[strum(to_string = "KC_COPY")] Copy = 0x7C,
    #[strum(to_string = "KC_PASTE", serialize = "KC_PSTE")] Paste = 0x7D,
    #[strum(to_string = "KC_FIND")] Find = 0x7E,
    #[strum(to_string = "KC_KB_MUTE")] KbMute = 0x7F,
    #[strum(to_string = "KC_KB_VOLUME_UP")] KbVolumeUp = 0x80,
    #[strum(to_string = "KC_KB_VOLUME_DOWN")] KbVolumeDown = 0x81,
    #[strum(to_string = "KC_LOCKING_CAPS_LOCK", serialize = "KC_LCAP")] LockingCapsLock = 0x82,
    #[strum(to_string = "KC_LOCKING_NUM_LOCK", serialize = "KC_LNUM")] LockingNumLock = 0x83,
    #[strum(to_string = "KC_LOCKING_SCROLL_LOCK", serialize = "KC_LSCR")] LockingScrollLock = 0x84,
    #[strum(to_string = "KC_KP_COMMA", serialize = "KC_PCMM")] KpComma = 0x85,
    #[strum(to_string = "KC_KP_EQUAL_AS400")] KpEqualAs400 = 0x86,

    #[strum(to_string = "KC_INTERNATIONAL_1", serialize = "KC_INT1")] International1 = 0x87,
    #[strum(to_string = "KC_INTERNATIONAL_2", serialize = "KC_INT2")] International2 = 0x88,
    #[strum(to_string = "KC_INTERNATIONAL_3", serialize = "KC_INT3")] International3 = 0x89,
    #[strum(to_string = "KC_INTERNATIONAL_4", serialize = "KC_INT4")] International4 = 0x8A,
    #[strum(to_string = "KC_INTERNATIONAL_5", serialize = "KC_INT5")] International5 = 0x8B,
    #[strum(to_string = "KC_INTERNATIONAL_6", serialize = "KC_INT6")] International6 = 0x8C,
    #[strum(to_string = "KC_INTERNATIONAL_7", serialize = "KC_INT7")] International7 = 0x8D,
    #[strum(to_string = "KC_INTERNATIONAL_8", serialize = "KC_INT8")] International8 = 0x8E,
    #[strum(to_string = "KC_INTERNATIONAL_9", serialize = "KC_INT9")] International9 = 0x8F,
    #[strum(to_string = "KC_LANGUAGE_1", serialize = "KC_LNG1")] Language1 = 0x90,
    #[strum(to_string = "KC_LANGUAGE_2", serialize = "KC_LNG2")] Language2 = 0x91,
    #[strum(to_string = "KC_LANGUAGE_3", serialize = "KC_LNG3")] Language3 = 0x92,
    #[strum(to_string = "KC_LANGUAGE_4", serialize = "KC_LNG4")] Language4 = 0x93,
    #[strum(to_string = "KC_LANGUAGE_5", serialize = "KC_LNG5")] Language5 = 0x94,
    #[strum(to_string = "KC_LANGUAGE_6", serialize = "KC_LNG6")] Language6 = 0x95,
    #[strum(to_string = "KC_LANGUAGE_7", serialize = "KC_LNG7")] Language7 = 0x96,
    #[strum(to_string = "KC_LANGUAGE_8", serialize = "KC_LNG8")] Language8 = 0x97,
    #[strum(to_string = "KC_LANGUAGE_9", serialize = "KC_LNG9")] Language9 = 0x98,

    #[strum(to_string = "KC_ALTERNATE_ERASE", serialize = "KC_ERAS")] AlternateErase = 0x99,
    #[strum(to_string = "KC_SYSTEM_REQUEST", serialize = "KC_SYRQ")] SystemRequest = 0x9A,
    #[strum(to_string = "KC_CANCEL", serialize = "KC_CNCL")] Cancel = 0x9B,
    #[strum(to_string = "KC_CLEAR", serialize = "KC_CLR")] Clear = 0x9C,
    #[strum(to_string = "KC_PRIOR", serialize = "KC_PRIR")] Prior = 0x9D,
    #[strum(to_string = "KC_RETURN", serialize = "KC_RETN")] Return = 0x9E,
    #[strum(to_string = "KC_SEPARATOR", serialize = "KC_SEPR")] Separator = 0x9F,
    #[strum(to_string = "KC_OUT")] Out = 0xA0,
    #[strum(to_string = "KC_OPER")] Oper = 0xA1,
    #[strum(to_string = "KC_CLEAR_AGAIN", serialize = "KC_CLAG")] ClearAgain = 0xA2,
    #[strum(to_string = "KC_CRSEL", serialize = "KC_CRSL")] Crsel = 0xA3,
    #[strum(to_string = "KC_EXSEL", serialize = "KC_EXSL")] Exsel = 0xA4,

    #[strum(to_string = "KC_SYSTEM_POWER", serialize = "KC_PWR")] SystemPower = 0xA5,
    #[strum(to_string = "KC_SYSTEM_SLEEP", serialize = "KC_SLEP")] SystemSleep = 0xA6,
    #[strum(to_string = "KC_SYSTEM_WAKE", serialize = "KC_WAKE")] SystemWake = 0xA7,
    #[strum(to_string = "KC_AUDIO_MUTE", serialize = "KC_MUTE")] AudioMute = 0xA8,
    #[strum(to_string = "KC_AUDIO_VOL_UP", serialize = "KC_VOLU")] AudioVolUp = 0xA9,
    #[strum(to_string = "KC_AUDIO_VOL_DOWN", serialize = "KC_VOLD")] AudioVolDown = 0xAA,
    #[strum(to_string = "KC_MEDIA_NEXT_TRACK", serialize = "KC_MNXT")] MediaNextTrack = 0xAB,
    #[strum(to_string = "KC_MEDIA_PREV_TRACK", serialize = "KC_MPRV")] MediaPrevTrack = 0xAC,
    #[strum(to_string = "KC_MEDIA_STOP", serialize = "KC_MSTP")] MediaStop = 0xAD,
    #[strum(to_string = "KC_MEDIA_PLAY_PAUSE", serialize = "KC_MPLY")] MediaPlayPause = 0xAE,
    #[strum(to_string = "KC_MEDIA_SELECT", serialize = "KC_MSEL")] MediaSelect = 0xAF,
    #[strum(to_string = "KC_MEDIA_EJECT", serialize = "KC_EJCT")] MediaEject = 0xB0,
    #[strum(to_string = "KC_MAIL")] Mail = 0xB1,
    #[strum(to_string = "KC_CALCULATOR", serialize = "KC_CALC")] Calculator = 0xB2,
    #[strum(to_string = "KC_MY_COMPUTER", serialize = "KC_MYCM")] MyComputer = 0xB3,
    #[strum(to_string = "KC_WWW_SEARCH", serialize = "KC_WSCH")] WwwSearch = 0xB4,
    #[strum(to_string = "KC_WWW_HOME", serialize = "KC_WHOM")] WwwHome = 0xB5,
    #[strum(to_string = "KC_WWW_BACK", serialize = "KC_WBAK")] WwwBack = 0xB6,
    #[strum(to_string = "KC_WWW_FORWARD", serialize = "KC_WFWD")] WwwForward = 0xB7,
    #[strum(to_string = "KC_WWW_STOP", serialize = "KC_WSTP")] WwwStop = 0xB8,
    #[strum(to_string = "KC_WWW_REFRESH", serialize = "KC_WREF")] WwwRefresh = 0xB9,
    #[strum(to_string = "KC_WWW_FAVORITES", serialize = "KC_WFAV")] WwwFavorites = 0xBA,
    #[strum(to_string = "KC_MEDIA_FAST_FORWARD", serialize = "KC_MFFD")] MediaFastForward = 0xBB,
    #[strum(to_string = "KC_MEDIA_REWIND", serialize = "KC_MRWD")] MediaRewind = 0xBC,
    #[strum(to_string = "KC_BRIGHTNESS_UP", serialize = "KC_BRIU")] BrightnessUp = 0xBD,
    #[strum(to_string = "KC_BRIGHTNESS_DOWN", serialize = "KC_BRID")] BrightnessDown = 0xBE,

    #[strum(to_string = "SP_KEY_LOCK")] KeyLock = 0xD0,
    #[strum(to_string = "SP_LAYER_LOCK")] LayerLock = 0xD1,
    #[strum(to_string = "SP_PROFILE_SWAP")] ProfileSwap = 0xD2,
    #[strum(to_string = "SP_PROFILE_NEXT")] ProfileNext = 0xD3,
    #[strum(to_string = "SP_BOOT")] Boot = 0xD4,

    #[strum(to_string = "KC_LEFT_CTRL", serialize = "KC_LCTL")] LeftCtrl = 0xE0,
    #[strum(to_string = "KC_LEFT_SHIFT", serialize = "KC_LSFT")] LeftShift = 0xE1,
    #[strum(to_string = "KC_LEFT_ALT", serialize = "KC_LALT", serialize = "KC_LOPT")] LeftAlt = 0xE2,
    #[strum(to_string = "KC_LEFT_GUI", serialize = "KC_LGUI", serialize = "KC_LCMD", serialize = "KC_LWIN")] LeftGui = 0xE3,
    #[strum(to_string = "KC_RIGHT_CTRL", serialize = "KC_RCTL")] RightCtrl = 0xE4,
    #[strum(to_string = "KC_RIGHT_SHIFT", serialize = "KC_RSFT")] RightShift = 0xE5,
    #[strum(to_string = "KC_RIGHT_ALT", serialize = "KC_RALT", serialize = "KC_ROPT", serialize = "KC_ALGR")] RightAlt = 0xE6,
    #[strum(to_string = "KC_RIGHT_GUI", serialize = "KC_RGUI", serialize = "KC_RCMD", serialize = "KC_RWIN")] RightGui = 0xE7,
}

impl Keycode {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Accepted spellings other than the canonical [`Display`](fmt::Display) name.
    pub fn aliases(self) -> Vec<&'static str> {
        let canonical = self.to_string();
        self.get_serializations()
            .iter()
            .copied()
            .filter(|name| *name != canonical)
            .collect()
    }
}

/// The two keycode families whose value depends on an index argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ParamKind {
    /// `MO(n)`: hold to activate layer `n`.
    #[strum(to_string = "MO")]
    MomentaryLayer,
    /// `PF(n)`: switch to profile `n`.
    #[strum(to_string = "PF")]
    Profile,
}

impl ParamKind {
    pub const fn base(self) -> u8 {
        match self {
            Self::MomentaryLayer => MO_BASE,
            Self::Profile => PF_BASE,
        }
    }

    /// Encodes `index` into this family's block, or `None` if it does not fit.
    pub const fn encode(self, index: u64) -> Option<u8> {
        if index < PARAM_SLOTS as u64 {
            Some(self.base() + index as u8)
        } else {
            None
        }
    }

    /// Inverse of [`ParamKind::encode`].
    pub fn decode(code: u8) -> Option<(Self, u8)> {
        [Self::MomentaryLayer, Self::Profile]
            .into_iter()
            .find(|kind| (kind.base()..kind.base() + PARAM_SLOTS).contains(&code))
            .map(|kind| (kind, code - kind.base()))
    }
}

/// `MO(layer)` as a keycode.
pub const fn mo(layer: u8) -> Option<u8> {
    ParamKind::MomentaryLayer.encode(layer as u64)
}

/// `PF(profile)` as a keycode.
pub const fn pf(profile: u8) -> Option<u8> {
    ParamKind::Profile.encode(profile as u64)
}

/// A keymap entry as written in the document, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeycodeToken<'a> {
    Literal(u8),
    Parameterized { kind: ParamKind, index: u64 },
    Named(&'a str),
}

impl fmt::Display for KeycodeToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(code) => write!(f, "{}", code),
            Self::Parameterized { kind, index } => write!(f, "{}({})", kind, index),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

static PARAMETERIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(MO|PF)\(([0-9]+)\)$").unwrap());
static PARAMETERIZED_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(MO|PF)\(").unwrap());

impl<'a> KeycodeToken<'a> {
    /// Classifies a raw entry. Named tokens are not looked up here.
    pub fn parse(value: &'a Value, path: &FieldPath) -> Validated<Self> {
        match value {
            Value::Number(_) => parse_u8(value, path).map(Self::Literal),
            Value::String(s) => {
                let Some(caps) = PARAMETERIZED.captures(s) else {
                    return Ok(Self::Named(s.as_str()));
                };
                let kind = if &caps[1] == "MO" {
                    ParamKind::MomentaryLayer
                } else {
                    ParamKind::Profile
                };
                let index = caps[2].parse::<u64>().map_err(|_| {
                    Report::single(
                        Issue::new(
                            IssueKind::Range,
                            path,
                            format!("index in '{}' is too large", s),
                        )
                        .with_input(value.clone()),
                    )
                })?;
                Ok(Self::Parameterized { kind, index })
            }
            other => Err(Report::single(
                Issue::new(
                    IssueKind::Type,
                    path,
                    format!(
                        "expected a keycode number or name, found {}",
                        json_kind(other)
                    ),
                )
                .with_input(other.clone()),
            )),
        }
    }

    pub fn resolve(&self, registry: &KeycodeRegistry, path: &FieldPath) -> Validated<u8> {
        match *self {
            Self::Literal(code) => Ok(code),
            Self::Parameterized { kind, index } => kind.encode(index).ok_or_else(|| {
                Report::single(
                    Issue::new(
                        IssueKind::Range,
                        path,
                        format!(
                            "{}({}) is out of range, index must be below {}",
                            kind, index, PARAM_SLOTS
                        ),
                    )
                    .with_input(Value::String(self.to_string())),
                )
            }),
            Self::Named(name) => {
                if let Some(code) = registry.get_code(name) {
                    return Ok(code);
                }
                let issue = if PARAMETERIZED_SHAPE.is_match(name) {
                    Issue::new(
                        IssueKind::Format,
                        path,
                        format!("malformed keycode '{}', expected MO(n) or PF(n)", name),
                    )
                } else {
                    Issue::new(
                        IssueKind::UnknownSymbol,
                        path,
                        format!("Unknown keycode: {}", name),
                    )
                };
                Err(Report::single(
                    issue.with_input(Value::String(name.to_string())),
                ))
            }
        }
    }
}

/// Resolves one keymap entry to its numeric keycode.
pub fn resolve_keycode(
    value: &Value,
    path: &FieldPath,
    registry: &KeycodeRegistry,
) -> Validated<u8> {
    KeycodeToken::parse(value, path)?.resolve(registry, path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeycodeDefinition {
    pub code: u8,
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Name lookup for the closed keycode table.
///
/// The built-in table comes from [`Keycode`]. A versioned JSON table with the same
/// shape can replace it when the firmware revision differs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeycodeRegistry {
    #[serde(default)]
    pub version: u32,

    pub definitions: Vec<KeycodeDefinition>,

    #[serde(skip)]
    name_to_code: HashMap<String, u8>,

    #[serde(skip)]
    code_to_name: HashMap<u8, String>,
}

/// Version tag of the built-in table.
pub const BUILTIN_TABLE_VERSION: u32 = 1;

static BUILTIN: Lazy<KeycodeRegistry> = Lazy::new(KeycodeRegistry::new_with_defaults);

/// Shared instance of the built-in table.
pub fn builtin_registry() -> &'static KeycodeRegistry {
    &BUILTIN
}

impl KeycodeRegistry {
    pub fn new_with_defaults() -> Self {
        let definitions = Keycode::iter()
            .map(|kc| KeycodeDefinition {
                code: kc.code(),
                id: kc.to_string(),
                aliases: kc.aliases().into_iter().map(String::from).collect(),
            })
            .collect();

        let mut reg = Self {
            version: BUILTIN_TABLE_VERSION,
            definitions,
            ..Default::default()
        };
        reg.rebuild_maps();
        reg
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KmResult<Self> {
        let content = fs::read_to_string(&path).map_err(|source| KeymetaError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> KmResult<Self> {
        let mut reg: Self = serde_json::from_str(content)?;
        reg.check_definitions()?;
        reg.rebuild_maps();
        Ok(reg)
    }

    fn check_definitions(&self) -> KmResult<()> {
        let mut seen: HashMap<&str, u8> = HashMap::new();
        for def in &self.definitions {
            for name in std::iter::once(&def.id).chain(def.aliases.iter()) {
                if PARAMETERIZED_SHAPE.is_match(name) {
                    return Err(KeymetaError::Config(format!(
                        "keycode name '{}' collides with the MO(n)/PF(n) syntax",
                        name
                    )));
                }
                if let Some(previous) = seen.insert(name.as_str(), def.code) {
                    if previous != def.code {
                        return Err(KeymetaError::Config(format!(
                            "keycode name '{}' maps to both 0x{:02X} and 0x{:02X}",
                            name, previous, def.code
                        )));
                    }
                }
            }
            if ParamKind::decode(def.code).is_some() {
                return Err(KeymetaError::Config(format!(
                    "keycode '{}' uses 0x{:02X}, which is reserved for MO(n)/PF(n)",
                    def.id, def.code
                )));
            }
        }
        Ok(())
    }

    fn rebuild_maps(&mut self) {
        self.name_to_code.clear();
        self.code_to_name.clear();

        for def in &self.definitions {
            self.code_to_name
                .entry(def.code)
                .or_insert_with(|| def.id.clone());
            self.name_to_code.insert(def.id.clone(), def.code);
            for alias in &def.aliases {
                self.name_to_code.insert(alias.clone(), def.code);
            }
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn get_code(&self, name: &str) -> Option<u8> {
        self.name_to_code.get(name).copied()
    }

    pub fn name_of(&self, code: u8) -> Option<&str> {
        self.code_to_name.get(&code).map(String::as_str)
    }

    /// Human-readable form of a resolved keycode, e.g. `KC_ESCAPE`, `MO(1)` or `0xF9`.
    pub fn describe(&self, code: u8) -> String {
        if let Some((kind, index)) = ParamKind::decode(code) {
            return format!("{}({})", kind, index);
        }
        match self.name_of(code) {
            Some(name) => name.to_string(),
            None => format!("0x{:02X}", code),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
