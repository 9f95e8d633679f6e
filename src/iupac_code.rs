const DNA_BITMASK_A: u8 = 1;
const DNA_BITMASK_C: u8 = 2;
const DNA_BITMASK_G: u8 = 4;
const DNA_BITMASK_T: u8 = 8;
const DNA_BITMASK_N: u8 = DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T;

/// Letters indexed by bitmask; index 0 is not a nucleotide.
const BITMASK_LETTERS: [u8; 16] = [
    b'-', b'A', b'C', b'M', b'G', b'R', b'S', b'V', b'T', b'W', b'Y', b'H', b'K', b'D', b'B', b'N',
];

/// A bitmasked IUPAC code for DNA bases, eg DNA_BITMASK_A|DNA_BITMASK_C
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    pub fn new(bitmask: u8) -> Self {
        Self(bitmask & DNA_BITMASK_N)
    }

    /// U reads as T; anything outside the IUPAC alphabet gives the empty code
    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        let letter = match letter.to_ascii_uppercase() {
            b'U' => b'T',
            other => other,
        };
        BITMASK_LETTERS[1..]
            .iter()
            .position(|known| *known == letter)
            .map_or(Self(0), |i| Self(i as u8 + 1))
    }

    #[inline(always)]
    pub fn to_letter(self) -> u8 {
        BITMASK_LETTERS[self.0 as usize]
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn subset(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Swaps A<->T and C<->G in the bitmask, so ambiguity codes complement too (R<->Y, B<->V, ...)
    #[inline(always)]
    pub fn complement(self) -> Self {
        let b = self.0;
        Self(
            ((b & DNA_BITMASK_A) << 3)
                | ((b & DNA_BITMASK_T) >> 3)
                | ((b & DNA_BITMASK_C) << 1)
                | ((b & DNA_BITMASK_G) >> 1),
        )
    }

    #[inline(always)]
    pub fn is_valid_letter(letter: u8) -> bool {
        !Self::from_letter(letter).is_empty()
    }

    /// True for A, C, G, T (and U), the only letters nearest-neighbor tables know about
    #[inline(always)]
    pub fn is_unambiguous_letter(letter: u8) -> bool {
        Self::from_letter(letter).0.count_ones() == 1
    }

    #[inline(always)]
    pub fn is_gc_letter(letter: u8) -> bool {
        matches!(letter.to_ascii_uppercase(), b'G' | b'C' | b'S')
    }

    #[inline(always)]
    pub fn to_vec(&self) -> Vec<u8> {
        [DNA_BITMASK_A, DNA_BITMASK_C, DNA_BITMASK_G, DNA_BITMASK_T]
            .iter()
            .filter(|bit| self.0 & **bit != 0)
            .map(|bit| BITMASK_LETTERS[*bit as usize])
            .collect()
    }

    /// Complements a single letter; anything that is not a nucleotide is returned unchanged
    #[inline(always)]
    pub fn letter_complement(letter: u8) -> u8 {
        let code = Self::from_letter(letter);
        if code.is_empty() {
            letter
        } else {
            code.complement().to_letter()
        }
    }

    pub fn complement_bytes(seq: &[u8]) -> Vec<u8> {
        seq.iter().map(|c| Self::letter_complement(*c)).collect()
    }

    pub fn reverse_complement_bytes(seq: &[u8]) -> Vec<u8> {
        seq.iter()
            .rev()
            .map(|c| Self::letter_complement(*c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base2iupac() {
        assert!(!IupacCode::from_letter(b'V')
            .subset(IupacCode::from_letter(b'G'))
            .is_empty());
        assert!(IupacCode::from_letter(b'H')
            .subset(IupacCode::from_letter(b'G'))
            .is_empty());
        assert_eq!(IupacCode::from_letter(b'U'), IupacCode::new(DNA_BITMASK_T));
        assert_eq!(IupacCode::from_letter(b'X'), IupacCode::new(0));
        assert_eq!(IupacCode::from_letter(b'r').to_letter(), b'R');
    }

    #[test]
    fn test_split_iupac() {
        assert_eq!(IupacCode::from_letter(b'M').to_vec(), vec![b'A', b'C']);
        assert_eq!(IupacCode::from_letter(b'V').to_vec(), vec![b'A', b'C', b'G']);
        assert_eq!(IupacCode::new(DNA_BITMASK_N).to_vec(), b"ACGT".to_vec());
    }

    #[test]
    fn test_complement() {
        assert_eq!(IupacCode::letter_complement(b'A'), b'T');
        assert_eq!(IupacCode::letter_complement(b'C'), b'G');
        assert_eq!(IupacCode::letter_complement(b'U'), b'A');
        assert_eq!(IupacCode::letter_complement(b'a'), b'T');
        assert_eq!(IupacCode::letter_complement(b'R'), b'Y');
        assert_eq!(IupacCode::letter_complement(b'K'), b'M');
        assert_eq!(IupacCode::letter_complement(b'B'), b'V');
        assert_eq!(IupacCode::letter_complement(b'D'), b'H');
        assert_eq!(IupacCode::letter_complement(b'S'), b'S');
        assert_eq!(IupacCode::letter_complement(b'W'), b'W');
        assert_eq!(IupacCode::letter_complement(b'N'), b'N');
        assert_eq!(IupacCode::letter_complement(b'X'), b'X');
    }

    #[test]
    fn test_reverse_complement_bytes() {
        assert_eq!(IupacCode::reverse_complement_bytes(b"ATGCR"), b"YGCAT".to_vec());
        assert_eq!(IupacCode::complement_bytes(b"ATGC"), b"TACG".to_vec());
    }

    #[test]
    fn test_letter_classes() {
        assert!(IupacCode::is_valid_letter(b'n'));
        assert!(!IupacCode::is_valid_letter(b'E'));
        assert!(IupacCode::is_unambiguous_letter(b'g'));
        assert!(!IupacCode::is_unambiguous_letter(b'N'));
        assert!(IupacCode::is_gc_letter(b'S'));
        assert!(!IupacCode::is_gc_letter(b'W'));
    }
}
