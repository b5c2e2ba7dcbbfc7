//! Rewriting of data sets read under implicit VR into their
//! dictionary-resolved explicit form.
//!
//! Every element's value representation is replaced by the one the
//! dictionary declares for its tag, recursing into nested sequences.
//! Private attributes are resolved under the private creator string
//! harvested from their group's creator slot.

use dcmio_core::dataset::{DataSet, ElementValue, EncodingMode};
use dcmio_core::header::{HasLength, Header, Tag};
use dcmio_core::{DataDictionary, VR};
use dcmio_encoding::text::{decode_trimmed, DefaultCharacterSetCodec};
use snafu::{Backtrace, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The on-disk value representation and the dictionary-resolved one
    /// disagree on the fundamental encoding class (character data vs.
    /// binary), so rewriting the VR would corrupt the value.
    #[snafu(display(
        "Cannot convert VR of {} from {} to {}: encoding classes disagree",
        tag,
        read,
        resolved
    ))]
    IncompatibleVr {
        tag: Tag,
        read: VR,
        resolved: VR,
        backtrace: Backtrace,
    },
    /// The dictionary resolved a short-header VR, but the value is too
    /// long for a 16-bit length field.
    #[snafu(display("Value of {} is too long ({} bytes) for explicit {}", tag, len, resolved))]
    ValueTooLong {
        tag: Tag,
        len: u32,
        resolved: VR,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rewrite every element's VR from the dictionary-resolved type and
/// rebind the data set to the explicit encoding mode.
///
/// Fails fast on the first element whose on-disk VR class is
/// incompatible with the dictionary's resolved class, unless the
/// on-disk VR was UN (unresolved).
pub fn to_explicit_vr<D>(ds: &mut DataSet, dict: &D) -> Result<()>
where
    D: DataDictionary,
{
    process_data_set(ds, dict)?;
    Ok(())
}

fn process_data_set<D>(ds: &mut DataSet, dict: &D) -> Result<()>
where
    D: DataDictionary,
{
    let text = DefaultCharacterSetCodec;
    let tags: Vec<Tag> = ds.iter().map(|e| e.tag()).collect();
    for tag in tags {
        // resolve the governing private creator before borrowing
        // the element mutably
        let creator = ds
            .private_creator(tag)
            .and_then(|bytes| decode_trimmed(&text, bytes).ok());
        let entry = dict.by_tag_with_creator(tag, creator.as_deref());
        let resolved = entry.map(|e| e.vr.relaxed());

        let elem = match ds.iter_mut().find(|e| e.tag() == tag) {
            Some(elem) => elem,
            None => continue,
        };

        let byte_length = match elem.value() {
            ElementValue::Bytes(data) => Some(data.len() as u32),
            ElementValue::Items(_) => None,
            // encapsulated pixel data is already OB/OW
            ElementValue::Fragments(_) => continue,
        };

        match byte_length {
            Some(len) => {
                let resolved = match resolved {
                    Some(vr) if vr != VR::UN && vr != VR::SQ => vr,
                    // nothing to resolve: the attribute stays as read
                    _ => continue,
                };
                let read = elem.vr();
                let compatible =
                    read == VR::UN || read.is_ascii() == resolved.is_ascii();
                if !compatible {
                    return IncompatibleVrSnafu {
                        tag,
                        read,
                        resolved,
                    }
                    .fail();
                }
                if !resolved.has_long_header() && len > u32::from(u16::MAX) {
                    return ValueTooLongSnafu { tag, len, resolved }.fail();
                }
                elem.set_vr(resolved);
            }
            None => {
                // sequences become explicit SQ of undefined length
                elem.set_vr(VR::SQ);
                if elem.length().is_defined() {
                    elem.set_length_undefined();
                }
                if let ElementValue::Items(seq) = elem.value_mut() {
                    seq.set_length_undefined();
                    for item in seq.items_mut() {
                        item.set_length_undefined();
                        process_data_set(item.nested_mut(), dict)?;
                    }
                }
            }
        }
    }
    ds.set_mode(EncodingMode::Explicit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmio_core::dataset::{DataElement, Item, SequenceOfItems};
    use dcmio_core::Length;
    use dcmio_dictionary_std::StandardDataDictionary;

    #[test]
    fn resolves_vrs_recursively() {
        let mut nested = DataSet::new(EncodingMode::Implicit);
        nested.put(DataElement::new(
            (0x0008, 0x1155),
            VR::UN,
            b"1.9\0".to_vec(),
        ));
        let mut items = SequenceOfItems::empty();
        items.push(Item::new(Length::UNDEFINED, nested));

        let mut ds = DataSet::new(EncodingMode::Implicit);
        ds.put(DataElement::new(
            (0x0008, 0x0018),
            VR::UN,
            b"1.2.3\0".to_vec(),
        ));
        ds.put(DataElement::new((0x0028, 0x0010), VR::UN, vec![0x00, 0x02]));
        ds.put(DataElement::new_sequence((0x0008, 0x1140), items));

        to_explicit_vr(&mut ds, &StandardDataDictionary).unwrap();

        assert_eq!(ds.mode(), EncodingMode::Explicit);
        assert_eq!(ds.element(Tag(0x0008, 0x0018)).unwrap().vr(), VR::UI);
        assert_eq!(ds.element(Tag(0x0028, 0x0010)).unwrap().vr(), VR::US);
        let seq_elem = ds.element(Tag(0x0008, 0x1140)).unwrap();
        assert_eq!(seq_elem.vr(), VR::SQ);
        let seq = seq_elem.value().as_items().unwrap();
        assert_eq!(
            seq.items()[0].nested().element(Tag(0x0008, 0x1155)).unwrap().vr(),
            VR::UI
        );
    }

    #[test]
    fn unknown_attributes_are_left_alone() {
        let mut ds = DataSet::new(EncodingMode::Implicit);
        ds.put(DataElement::new((0x0009, 0x1001), VR::UN, vec![0x01]));
        to_explicit_vr(&mut ds, &StandardDataDictionary).unwrap();
        assert_eq!(ds.element(Tag(0x0009, 0x1001)).unwrap().vr(), VR::UN);
    }

    #[test]
    fn class_clash_fails_fast() {
        // Rows resolved as US (binary), but the value was read as
        // character data
        let mut ds = DataSet::new(EncodingMode::Implicit);
        ds.put(DataElement::new(
            (0x0028, 0x0010),
            VR::IS,
            b"512 ".to_vec(),
        ));
        let result = to_explicit_vr(&mut ds, &StandardDataDictionary);
        assert!(matches!(result, Err(Error::IncompatibleVr { .. })));
    }
}
