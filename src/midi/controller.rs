/// Control change numbers are 7-bit.
pub const CONTROLLER_COUNT: u8 = 128;

/// Controllers 0x00..0x40 come in MSB/LSB pairs, `lsb` marks the low half
/// (numbers 0x20..0x40).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ControlTarget {
    Low { number: u8, lsb: bool },
    Controller(Controller),
}

impl ControlTarget {
    pub const fn from_number(number: u8) -> Self {
        if number < 0x40 {
            ControlTarget::Low {
                number: number & 0x1F,
                lsb: number >= 0x20,
            }
        } else {
            ControlTarget::Controller(Controller::from_u8(number))
        }
    }

    pub const fn number(&self) -> u8 {
        match self {
            ControlTarget::Low { number, lsb } => {
                if *lsb {
                    *number | 0x20
                } else {
                    *number
                }
            }
            ControlTarget::Controller(c) => c.as_u8(),
        }
    }
}

/// Single-byte controllers and channel mode messages.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Controller {
    Sustain,
    Portamento,
    Sostenuto,
    SoftPedal,
    Legato,
    Hold2,
    /// Sound controllers 1 through 10 (0x46..=0x4F).
    SoundController(u8),
    /// General purpose controllers 5 through 8 (0x50..=0x53).
    GeneralPurpose(u8),
    PortamentoControl,
    HighResVelocityPrefix,
    /// Effects 1 through 5 depth (0x5B..=0x5F).
    EffectsDepth(u8),
    DataIncrement,
    DataDecrement,
    NrpnLsb,
    NrpnMsb,
    RpnLsb,
    RpnMsb,
    AllSoundOff,
    ResetAllControllers,
    LocalControl,
    AllNotesOff,
    OmniOff,
    OmniOn,
    MonoOn,
    PolyOn,
    Undefined(u8),
}

impl Controller {
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0x40 => Controller::Sustain,
            0x41 => Controller::Portamento,
            0x42 => Controller::Sostenuto,
            0x43 => Controller::SoftPedal,
            0x44 => Controller::Legato,
            0x45 => Controller::Hold2,
            0x46..=0x4F => Controller::SoundController(raw - 0x45),
            0x50..=0x53 => Controller::GeneralPurpose(raw - 0x4B),
            0x54 => Controller::PortamentoControl,
            0x58 => Controller::HighResVelocityPrefix,
            0x5B..=0x5F => Controller::EffectsDepth(raw - 0x5A),
            0x60 => Controller::DataIncrement,
            0x61 => Controller::DataDecrement,
            0x62 => Controller::NrpnLsb,
            0x63 => Controller::NrpnMsb,
            0x64 => Controller::RpnLsb,
            0x65 => Controller::RpnMsb,
            0x78 => Controller::AllSoundOff,
            0x79 => Controller::ResetAllControllers,
            0x7A => Controller::LocalControl,
            0x7B => Controller::AllNotesOff,
            0x7C => Controller::OmniOff,
            0x7D => Controller::OmniOn,
            0x7E => Controller::MonoOn,
            0x7F => Controller::PolyOn,
            other => Controller::Undefined(other),
        }
    }

    pub const fn as_u8(&self) -> u8 {
        match self {
            Controller::Sustain => 0x40,
            Controller::Portamento => 0x41,
            Controller::Sostenuto => 0x42,
            Controller::SoftPedal => 0x43,
            Controller::Legato => 0x44,
            Controller::Hold2 => 0x45,
            Controller::SoundController(n) => 0x45 + *n,
            Controller::GeneralPurpose(n) => 0x4B + *n,
            Controller::PortamentoControl => 0x54,
            Controller::HighResVelocityPrefix => 0x58,
            Controller::EffectsDepth(n) => 0x5A + *n,
            Controller::DataIncrement => 0x60,
            Controller::DataDecrement => 0x61,
            Controller::NrpnLsb => 0x62,
            Controller::NrpnMsb => 0x63,
            Controller::RpnLsb => 0x64,
            Controller::RpnMsb => 0x65,
            Controller::AllSoundOff => 0x78,
            Controller::ResetAllControllers => 0x79,
            Controller::LocalControl => 0x7A,
            Controller::AllNotesOff => 0x7B,
            Controller::OmniOff => 0x7C,
            Controller::OmniOn => 0x7D,
            Controller::MonoOn => 0x7E,
            Controller::PolyOn => 0x7F,
            Controller::Undefined(raw) => *raw,
        }
    }
}
