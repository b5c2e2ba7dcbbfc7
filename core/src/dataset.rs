//! In-memory representation of DICOM data sets:
//! data elements, nested item sequences, and pixel data fragment sequences.

use snafu::{ensure, Backtrace, Snafu};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::header::{DataElementHeader, HasLength, Header, Length, Tag};
use crate::vr::VR;

/// The element encoding mode bound to a data set,
/// determining which element codec applies uniformly
/// to the whole set and its nested content.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EncodingMode {
    /// The value representation is encoded per element.
    Explicit,
    /// The value representation is resolved from a data dictionary.
    Implicit,
}

/// Error raised when reconstructing a contiguous buffer from
/// a fragment sequence and the total does not match expectations.
#[derive(Debug, Snafu)]
#[snafu(display(
    "fragmented pixel data totals {} bytes, expected {}",
    got,
    expected
))]
pub struct FragmentBufferError {
    /// total number of bytes across data fragments
    pub got: usize,
    /// number of bytes requested by the caller
    pub expected: usize,
    backtrace: Backtrace,
}

/// The value of a data element: exactly one variant is populated,
/// in agreement with the element's value representation.
/// SQ (and UN with undefined length) elements hold items,
/// OB/OW elements of undefined length hold fragments,
/// and everything else holds plain bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// An opaque byte buffer, in native byte order for binary
    /// representations.
    Bytes(Vec<u8>),
    /// A sequence of items, each containing a nested data set.
    Items(SequenceOfItems),
    /// A sequence of pixel data fragments led by a basic offset table.
    Fragments(SequenceOfFragments),
}

impl ElementValue {
    /// Get the value as a plain byte slice, if it is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ElementValue::Bytes(data) => Some(data),
            _ => None,
        }
    }

    /// Get the value as an item sequence, if it is one.
    pub fn as_items(&self) -> Option<&SequenceOfItems> {
        match self {
            ElementValue::Items(sq) => Some(sq),
            _ => None,
        }
    }

    /// Get the value as a fragment sequence, if it is one.
    pub fn as_fragments(&self) -> Option<&SequenceOfFragments> {
        match self {
            ElementValue::Fragments(sq) => Some(sq),
            _ => None,
        }
    }
}

/// A data type that represents and owns a DICOM data element,
/// whether it holds a primitive value,
/// a nested item sequence,
/// or an encapsulated pixel data fragment sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    header: DataElementHeader,
    value: ElementValue,
}

impl HasLength for DataElement {
    #[inline]
    fn length(&self) -> Length {
        self.header.len
    }
}

impl Header for DataElement {
    #[inline]
    fn tag(&self) -> Tag {
        self.header.tag
    }
}

impl DataElement {
    /// Create a primitive data element from the given parts,
    /// where the length is inferred from the value's byte length.
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, value: Vec<u8>) -> Self {
        DataElement {
            header: DataElementHeader::new(tag, vr, Length(value.len() as u32)),
            value: ElementValue::Bytes(value),
        }
    }

    /// Create a data element from the given parts.
    ///
    /// This method will not check
    /// whether the length accurately represents the given value's byte
    /// length, nor whether the value representation agrees with the value
    /// variant.
    pub fn new_with_len<T: Into<Tag>>(tag: T, vr: VR, len: Length, value: ElementValue) -> Self {
        DataElement {
            header: DataElementHeader::new(tag, vr, len),
            value,
        }
    }

    /// Create a sequence element over the given items.
    pub fn new_sequence<T: Into<Tag>>(tag: T, items: SequenceOfItems) -> Self {
        let len = items.length();
        DataElement {
            header: DataElementHeader::new(tag, VR::SQ, len),
            value: ElementValue::Items(items),
        }
    }

    /// Create an encapsulated pixel data element over the given fragments.
    pub fn new_fragments<T: Into<Tag>>(tag: T, vr: VR, fragments: SequenceOfFragments) -> Self {
        DataElement {
            header: DataElementHeader::new(tag, vr, Length::UNDEFINED),
            value: ElementValue::Fragments(fragments),
        }
    }

    /// Retrieve the element header.
    pub fn header(&self) -> &DataElementHeader {
        &self.header
    }

    /// Retrieve the value representation, which may be UN
    /// if it was not resolved at read time.
    pub fn vr(&self) -> VR {
        self.header.vr
    }

    /// Replace the element's value representation.
    pub fn set_vr(&mut self, vr: VR) {
        self.header.vr = vr;
    }

    /// Replace the element's declared length with the undefined sentinel.
    pub fn set_length_undefined(&mut self) {
        self.header.len = Length::UNDEFINED;
    }

    /// Retrieve the data value.
    pub fn value(&self) -> &ElementValue {
        &self.value
    }

    /// Retrieve the data value for mutation.
    pub fn value_mut(&mut self) -> &mut ElementValue {
        &mut self.value
    }

    /// Move the data value out of the element, discarding the header.
    pub fn into_value(self) -> ElementValue {
        self.value
    }
}

/// An item of a sequence: one nested data set
/// plus the item's own declared length (definite or undefined).
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    len: Length,
    nested: DataSet,
}

impl Item {
    /// Create an item over the given nested data set.
    pub fn new(len: Length, nested: DataSet) -> Self {
        Item { len, nested }
    }

    /// The nested data set owned by this item.
    pub fn nested(&self) -> &DataSet {
        &self.nested
    }

    /// The nested data set owned by this item, for mutation.
    pub fn nested_mut(&mut self) -> &mut DataSet {
        &mut self.nested
    }

    /// Replace the item's declared length with the undefined sentinel.
    pub fn set_length_undefined(&mut self) {
        self.len = Length::UNDEFINED;
    }
}

impl HasLength for Item {
    fn length(&self) -> Length {
        self.len
    }
}

/// A sequence of items, the value of an SQ element.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOfItems {
    len: Length,
    items: Vec<Item>,
}

impl SequenceOfItems {
    /// Create a sequence from the given items
    /// and the enclosing element's declared length.
    pub fn new(len: Length, items: Vec<Item>) -> Self {
        SequenceOfItems { len, items }
    }

    /// Create an empty sequence of undefined length.
    pub fn empty() -> Self {
        SequenceOfItems {
            len: Length::UNDEFINED,
            items: Vec::new(),
        }
    }

    /// The items in this sequence.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The items in this sequence, for mutation.
    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    /// Append an item to the sequence.
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Mark this sequence (but not its items) as undefined length.
    pub fn set_length_undefined(&mut self) {
        self.len = Length::UNDEFINED;
    }
}

impl HasLength for SequenceOfItems {
    fn length(&self) -> Length {
        self.len
    }
}

/// One raw chunk of a segmented pixel data stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment(pub Vec<u8>);

impl Fragment {
    /// The fragment's payload.
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    /// The payload size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A sequence of pixel data fragments.
///
/// The leading basic offset table is kept apart from the data
/// fragments: it is not pixel data and is never counted by
/// [`number_of_fragments`](SequenceOfFragments::number_of_fragments).
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOfFragments {
    offset_table: Vec<u8>,
    fragments: Vec<Fragment>,
}

impl SequenceOfFragments {
    /// Create a fragment sequence from an offset table (possibly empty)
    /// and the data fragments.
    pub fn new(offset_table: Vec<u8>, fragments: Vec<Fragment>) -> Self {
        SequenceOfFragments {
            offset_table,
            fragments,
        }
    }

    /// The raw basic offset table.
    pub fn offset_table(&self) -> &[u8] {
        &self.offset_table
    }

    /// The data fragments, excluding the offset table.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The number of data fragments. The offset table is not counted.
    pub fn number_of_fragments(&self) -> usize {
        self.fragments.len()
    }

    /// The total number of payload bytes across all data fragments.
    pub fn total_byte_length(&self) -> usize {
        self.fragments.iter().map(Fragment::len).sum()
    }

    /// Reconstruct a contiguous buffer by concatenating all data
    /// fragment payloads in order.
    ///
    /// Fails if the concatenated size disagrees with the caller's
    /// expected length.
    pub fn combined_buffer(&self, expected: usize) -> Result<Vec<u8>, FragmentBufferError> {
        let total = self.total_byte_length();
        ensure!(
            total == expected,
            FragmentBufferSnafu {
                got: total,
                expected
            }
        );
        let mut out = Vec::with_capacity(total);
        for frag in &self.fragments {
            out.extend_from_slice(frag.data());
        }
        Ok(out)
    }
}

/// An in-memory DICOM data set: an ordered-by-tag collection of
/// data elements, with uniqueness of tags (re-insertion replaces)
/// and an element encoding mode bound at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    mode: EncodingMode,
    entries: BTreeMap<Tag, DataElement>,
}

impl DataSet {
    /// Create an empty data set bound to the given encoding mode.
    pub fn new(mode: EncodingMode) -> Self {
        DataSet {
            mode,
            entries: BTreeMap::new(),
        }
    }

    /// The element encoding mode bound to this data set.
    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Rebind the element encoding mode.
    /// Nested data sets are not visited.
    pub fn set_mode(&mut self, mode: EncodingMode) {
        self.mode = mode;
    }

    /// Insert a data element, replacing any element with the same tag.
    pub fn put(&mut self, elem: DataElement) {
        self.entries.insert(elem.tag(), elem);
    }

    /// Whether an element with the given tag is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Fetch the element with the given tag, if present.
    pub fn element(&self, tag: Tag) -> Option<&DataElement> {
        self.entries.get(&tag)
    }

    /// Fetch the raw value bytes of the element with the given tag,
    /// if the element is present and holds plain bytes.
    pub fn element_bytes(&self, tag: Tag) -> Option<&[u8]> {
        self.element(tag).and_then(|e| e.value().as_bytes())
    }

    /// Remove the element with the given tag, returning it if present.
    pub fn take(&mut self, tag: Tag) -> Option<DataElement> {
        self.entries.remove(&tag)
    }

    /// Iterate over the elements in ascending tag order.
    pub fn iter(&self) -> btree_map::Values<'_, Tag, DataElement> {
        self.entries.values()
    }

    /// Iterate mutably over the elements in ascending tag order.
    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, Tag, DataElement> {
        self.entries.values_mut()
    }

    /// The number of elements in the set (top level only).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve the private creator string governing the given private
    /// tag, by looking up the creator slot (same group, element
    /// `0x00XX` where `XX` is the high byte of the element number).
    pub fn private_creator(&self, tag: Tag) -> Option<&[u8]> {
        if !tag.is_private() || tag.is_private_creator() {
            return None;
        }
        let creator_element = tag.element() >> 8;
        if !(0x0010..=0x00FF).contains(&creator_element) {
            return None;
        }
        self.element_bytes(Tag(tag.group(), creator_element))
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a DataElement;
    type IntoIter = btree_map::Values<'a, Tag, DataElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_set_orders_by_tag_and_replaces() {
        let mut ds = DataSet::new(EncodingMode::Explicit);
        ds.put(DataElement::new((0x0010, 0x0020), VR::LO, b"ID1".to_vec()));
        ds.put(DataElement::new(
            (0x0008, 0x0018),
            VR::UI,
            b"1.2.3\0".to_vec(),
        ));
        ds.put(DataElement::new((0x0010, 0x0020), VR::LO, b"ID2".to_vec()));

        let tags: Vec<Tag> = ds.iter().map(|e| e.tag()).collect();
        assert_eq!(tags, vec![Tag(0x0008, 0x0018), Tag(0x0010, 0x0020)]);
        assert_eq!(
            ds.element_bytes(Tag(0x0010, 0x0020)),
            Some(&b"ID2"[..])
        );
    }

    #[test]
    fn fragment_buffer_reconstruction() {
        let sq = SequenceOfFragments::new(
            vec![],
            vec![Fragment(vec![1, 2, 3]), Fragment(vec![4, 5])],
        );
        assert_eq!(sq.number_of_fragments(), 2);
        assert_eq!(sq.total_byte_length(), 5);
        assert_eq!(sq.combined_buffer(5).unwrap(), vec![1, 2, 3, 4, 5]);
        // a disagreeing expected length must fail
        assert!(sq.combined_buffer(6).is_err());
    }

    #[test]
    fn offset_table_not_counted_as_data() {
        let sq = SequenceOfFragments::new(vec![0, 0, 0, 0], vec![Fragment(vec![0xFF; 8])]);
        assert_eq!(sq.number_of_fragments(), 1);
        assert_eq!(sq.total_byte_length(), 8);
    }

    #[test]
    fn private_creator_resolution() {
        let mut ds = DataSet::new(EncodingMode::Implicit);
        ds.put(DataElement::new(
            (0x0009, 0x0010),
            VR::LO,
            b"ACME 1.1".to_vec(),
        ));
        ds.put(DataElement::new(
            (0x0009, 0x1001),
            VR::UN,
            vec![0x01, 0x02],
        ));
        assert_eq!(
            ds.private_creator(Tag(0x0009, 0x1001)),
            Some(&b"ACME 1.1"[..])
        );
        assert_eq!(ds.private_creator(Tag(0x0009, 0x0010)), None);
        assert_eq!(ds.private_creator(Tag(0x0008, 0x0018)), None);
    }
}
