//! Three-level sparse word array (C2.3): like [`super::bitset::SparseBitset`]
//! but each 64-bit leaf word packs `N = 64 / bits_per_value` values. Storing
//! every address of a tile in one machine word is what lets the collision
//! and tile-type maps answer an all-addresses query with a single read.

use super::{bits_per_value_is_valid, BitContainer, Persist, WordContainer};
use crate::error::{Error, Result};
use crate::io::{read_len, Data};
use std::io::{Read, Write};

const L2_LEN: usize = 32;
const L3_LEN: usize = 32;

/// Wire format version, written as the first byte of every serialized word
/// array, matching [`super::bitset::SparseBitset`]'s own version byte.
const FORMAT_VERSION: u8 = 1;

type Leaf = [u64; L3_LEN];
type Level2 = [Option<Box<Leaf>>; L2_LEN];

#[derive(Debug, Clone)]
pub struct SparseWordArray {
    bits_per_value: u32,
    values_per_word: u32,
    level1: Vec<Option<Box<Level2>>>,
}

fn empty_level2() -> Level2 {
    Default::default()
}

impl SparseWordArray {
    pub fn new(bits_per_value: u32) -> Result<Self> {
        if !bits_per_value_is_valid(bits_per_value) {
            return Err(Error::invalid_value(format!(
                "bits_per_value must be one of 1,2,4,8,16,32,64 (got {})",
                bits_per_value
            )));
        }

        Ok(Self {
            bits_per_value,
            values_per_word: 64 / bits_per_value,
            level1: Vec::new(),
        })
    }

    fn split(&self, index: u32) -> (usize, usize, usize, u32) {
        let per_word = self.values_per_word;
        let slot_in_word = index % per_word;
        let word_index = (index / per_word) % L3_LEN as u32;
        let level2_index = (index / (per_word * L3_LEN as u32)) % L2_LEN as u32;
        let level1_index = index / (per_word * L3_LEN as u32 * L2_LEN as u32);

        (
            level1_index as usize,
            level2_index as usize,
            word_index as usize,
            slot_in_word,
        )
    }

    fn ensure_level1_capacity(&mut self, w1: usize) {
        if self.level1.len() > w1 {
            return;
        }

        let mut new_len = self.level1.len().max(1);
        while new_len <= w1 {
            new_len *= 2;
        }

        self.level1.resize_with(new_len, || None);
    }
}

impl WordContainer for SparseWordArray {
    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn get(&self, index: u32) -> u64 {
        let (w1, w2, w3, slot) = self.split(index);

        let level2 = match self.level1.get(w1).and_then(|entry| entry.as_ref()) {
            Some(level2) => level2,
            None => return 0,
        };

        let leaf = match &level2[w2] {
            Some(leaf) => leaf,
            None => return 0,
        };

        let offset = slot * self.bits_per_value;
        (leaf[w3] >> offset) & self.value_mask()
    }

    fn set(&mut self, index: u32, value: u64) {
        let (w1, w2, w3, slot) = self.split(index);
        let offset = slot * self.bits_per_value;
        let mask = self.value_mask() << offset;

        self.ensure_level1_capacity(w1);
        let level2 = self.level1[w1].get_or_insert_with(|| Box::new(empty_level2()));
        let leaf = level2[w2].get_or_insert_with(|| Box::new([0u64; L3_LEN]));

        leaf[w3] = (leaf[w3] & !mask) | ((value & self.value_mask()) << offset);
    }
}

/// Using a 1-bit word array as a plain bit container is occasionally handy
/// (e.g. sharing the on-disk reader code path with [`super::SparseBitset`]),
/// so it gets the same [`BitContainer`] impl the bitset has.
impl BitContainer for SparseWordArray {
    fn get(&self, index: u32) -> bool {
        WordContainer::get(self, index) != 0
    }

    fn set(&mut self, index: u32, value: bool) {
        WordContainer::set(self, index, value as u64);
    }
}

impl Persist for SparseWordArray {
    fn serialize(&self, write: &mut impl Write) -> Result<()> {
        FORMAT_VERSION.write(write)?;
        (self.bits_per_value as i32).write(write)?;
        (self.level1.len() as i32).write(write)?;

        for entry in &self.level1 {
            match entry {
                None => false.write(write)?,
                Some(level2) => {
                    true.write(write)?;

                    for leaf in level2.iter() {
                        match leaf {
                            None => false.write(write)?,
                            Some(words) => {
                                true.write(write)?;
                                for word in words.iter() {
                                    word.write(write)?;
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn deserialize(read: &mut impl Read) -> Result<Self> {
        let version = u8::read(read)?;
        if version != FORMAT_VERSION {
            return Err(Error::corrupt(format!(
                "unsupported sparse word array format version {}",
                version
            )));
        }

        let bits_per_value = i32::read(read)?;
        if bits_per_value <= 0 || !bits_per_value_is_valid(bits_per_value as u32) {
            return Err(Error::corrupt(format!(
                "invalid bits_per_value in wordset stream: {}",
                bits_per_value
            )));
        }

        let mut array = SparseWordArray::new(bits_per_value as u32)?;
        let level1_len = read_len(read, 1 << 20)?;
        let mut level1 = Vec::with_capacity(level1_len);

        for _ in 0..level1_len {
            let present = bool::read(read)?;

            if !present {
                level1.push(None);
                continue;
            }

            let mut level2 = empty_level2();

            for slot in level2.iter_mut() {
                let leaf_present = bool::read(read)?;
                if !leaf_present {
                    continue;
                }

                let mut words = [0u64; L3_LEN];
                for word in words.iter_mut() {
                    *word = u64::read(read)?;
                }

                *slot = Some(Box::new(words));
            }

            level1.push(Some(Box::new(level2)));
        }

        array.level1 = level1;
        Ok(array)
    }
}

/// Fails when the container's `bits_per_value` does not match the value
/// recorded on disk — the `FormatMismatch` error kind exists for exactly
/// this check.
pub fn deserialize_expecting(read: &mut impl Read, expected_bits_per_value: u32) -> Result<SparseWordArray> {
    let array = SparseWordArray::deserialize(read)?;

    if array.bits_per_value() != expected_bits_per_value {
        return Err(Error::format_mismatch(format!(
            "stream has bits_per_value={}, expected {}",
            array.bits_per_value(),
            expected_bits_per_value
        )));
    }

    Ok(array)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_invalid_bits_per_value() {
        assert!(SparseWordArray::new(3).is_err());
        assert!(SparseWordArray::new(0).is_err());
        assert!(SparseWordArray::new(64).is_ok());
    }

    #[test]
    fn unset_reads_zero() {
        let array = SparseWordArray::new(4).unwrap();
        assert_eq!(array.get(12345), 0);
    }

    #[test]
    fn four_bit_values_roundtrip() {
        let mut array = SparseWordArray::new(4).unwrap();
        array.set(0, 0xF);
        array.set(1, 0x5);
        array.set(16, 0xA);

        assert_eq!(array.get(0), 0xF);
        assert_eq!(array.get(1), 0x5);
        assert_eq!(array.get(16), 0xA);
        assert_eq!(array.get(2), 0);
    }

    #[test]
    fn value_is_masked_to_bit_width() {
        let mut array = SparseWordArray::new(4).unwrap();
        array.set(0, 0xFF);
        assert_eq!(array.get(0), 0x0F);
    }

    #[test]
    fn serialize_deserialize_roundtrip_preserves_bits_per_value_and_values() {
        let mut array = SparseWordArray::new(8).unwrap();
        array.set(0, 200);
        array.set(1, 1);
        array.set(9000, 255);

        let mut buffer = Vec::new();
        array.serialize(&mut buffer).unwrap();

        let restored = SparseWordArray::deserialize(&mut buffer.as_slice()).unwrap();
        assert_eq!(restored.bits_per_value(), 8);
        assert_eq!(restored.get(0), 200);
        assert_eq!(restored.get(1), 1);
        assert_eq!(restored.get(9000), 255);
        assert_eq!(restored.get(2), 0);
    }

    #[test]
    fn deserialize_rejects_unknown_format_version() {
        let array = SparseWordArray::new(8).unwrap();
        let mut buffer = Vec::new();
        array.serialize(&mut buffer).unwrap();
        buffer[0] = FORMAT_VERSION + 1;

        assert!(matches!(SparseWordArray::deserialize(&mut buffer.as_slice()), Err(Error::CorruptData(_))));
    }

    #[test]
    fn deserialize_expecting_rejects_mismatched_width() {
        let array = SparseWordArray::new(8).unwrap();
        let mut buffer = Vec::new();
        array.serialize(&mut buffer).unwrap();

        let result = deserialize_expecting(&mut buffer.as_slice(), 4);
        assert!(matches!(result, Err(Error::FormatMismatch(_))));
    }
}
