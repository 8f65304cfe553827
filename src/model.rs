#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NoteClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl NoteClass {
    pub const fn all() -> &'static [NoteClass] {
        &[
            NoteClass::C,
            NoteClass::Cs,
            NoteClass::D,
            NoteClass::Ds,
            NoteClass::E,
            NoteClass::F,
            NoteClass::Fs,
            NoteClass::G,
            NoteClass::Gs,
            NoteClass::A,
            NoteClass::As,
            NoteClass::B,
        ]
    }
    pub const fn from_u8(raw: u8) -> Self {
        match raw % 12 {
            0 => NoteClass::C,
            1 => NoteClass::Cs,
            2 => NoteClass::D,
            3 => NoteClass::Ds,
            4 => NoteClass::E,
            5 => NoteClass::F,
            6 => NoteClass::Fs,
            7 => NoteClass::G,
            8 => NoteClass::Gs,
            9 => NoteClass::A,
            10 => NoteClass::As,
            // Always 11
            _ => NoteClass::B,
        }
    }
    pub const fn as_u8(&self) -> u8 {
        match self {
            NoteClass::C => 0,
            NoteClass::Cs => 1,
            NoteClass::D => 2,
            NoteClass::Ds => 3,
            NoteClass::E => 4,
            NoteClass::F => 5,
            NoteClass::Fs => 6,
            NoteClass::G => 7,
            NoteClass::Gs => 8,
            NoteClass::A => 9,
            NoteClass::As => 10,
            NoteClass::B => 11,
        }
    }

    /// Whether this note sits on a black key of a piano keyboard.
    pub const fn is_black(&self) -> bool {
        matches!(
            self,
            NoteClass::Cs | NoteClass::Ds | NoteClass::Fs | NoteClass::Gs | NoteClass::As
        )
    }

    /// Index of the note among the 7 white keys of an octave.
    pub const fn white_position(&self) -> Option<u8> {
        match self {
            NoteClass::C => Some(0),
            NoteClass::D => Some(1),
            NoteClass::E => Some(2),
            NoteClass::F => Some(3),
            NoteClass::G => Some(4),
            NoteClass::A => Some(5),
            NoteClass::B => Some(6),
            _ => None,
        }
    }

    /// Index of the note among the 5 black keys of an octave.
    pub const fn black_position(&self) -> Option<u8> {
        match self {
            NoteClass::Cs => Some(0),
            NoteClass::Ds => Some(1),
            NoteClass::Fs => Some(2),
            NoteClass::Gs => Some(3),
            NoteClass::As => Some(4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_numbers() {
        for (raw, note) in NoteClass::all().iter().enumerate() {
            assert_eq!(raw as u8, note.as_u8());
            assert_eq!(*note, NoteClass::from_u8(raw as u8 + 24));
        }
    }

    #[test]
    fn test_key_colors() {
        let black = NoteClass::all().iter().filter(|n| n.is_black()).count();
        assert_eq!(5, black);
        for note in NoteClass::all() {
            assert_ne!(
                note.white_position().is_some(),
                note.black_position().is_some(),
                "{:?}",
                note
            );
        }
        assert_eq!(Some(6), NoteClass::B.white_position());
        assert_eq!(Some(4), NoteClass::As.black_position());
    }
}
