//! Core attribute dictionary types.
//!
//! The dictionary is an external collaborator to the codec:
//! a read-only lookup service mapping tags to their canonical
//! value representation, multiplicity, and name.
//! It is always passed down explicitly,
//! never reached through global state.

use crate::header::Tag;
use crate::vm::VM;
use crate::vr::VR;

/// A "virtual" value representation descriptor
/// which extends the standard enumeration with context-dependent
/// representations.
///
/// It is used by dictionary entries to describe circumstances in which
/// the real VR depends on other attributes of the object.
/// As an example, the _Pixel Data_ attribute can have a value
/// representation of either OB or OW.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum VirtualVr {
    /// The value representation is exactly known
    /// and does not depend on context.
    Exact(VR),
    /// Either OB or OW, depending on the bit depth of the samples.
    ObOw,
    /// Either US or SS, depending on the pixel representation.
    UsSs,
    /// US, SS or OW; occurs in LUT descriptor attributes.
    UsSsOw,
}

impl From<VR> for VirtualVr {
    fn from(value: VR) -> Self {
        VirtualVr::Exact(value)
    }
}

impl VirtualVr {
    /// Return the underlying value representation
    /// in the case that it can be unambiguously defined without context.
    pub fn exact(self) -> Option<VR> {
        match self {
            VirtualVr::Exact(vr) => Some(vr),
            _ => None,
        }
    }

    /// Return the underlying value representation,
    /// making a relaxed conversion if it cannot be
    /// accurately resolved without context:
    ///
    /// - [`ObOw`](VirtualVr::ObOw) is relaxed to OW
    /// - [`UsSs`](VirtualVr::UsSs) is relaxed to US
    /// - [`UsSsOw`](VirtualVr::UsSsOw) is relaxed to US
    pub fn relaxed(self) -> VR {
        match self {
            VirtualVr::Exact(vr) => vr,
            VirtualVr::ObOw => VR::OW,
            VirtualVr::UsSs => VR::US,
            VirtualVr::UsSsOw => VR::US,
        }
    }
}

/// A dictionary entry record:
/// the canonical value representation, multiplicity,
/// and keyword of one attribute.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DictEntry {
    /// The attribute's value representation, possibly context-dependent.
    pub vr: VirtualVr,
    /// The attribute's value multiplicity.
    pub vm: VM,
    /// The attribute keyword (alias), as in the standard dictionary.
    pub alias: &'static str,
}

impl DictEntry {
    /// Create an entry record. This is just a trivial constructor.
    pub const fn new(vr: VirtualVr, vm: VM, alias: &'static str) -> Self {
        DictEntry { vr, vm, alias }
    }
}

/// Type trait for a dictionary of DICOM attributes.
///
/// Implementations resolve a tag (plus, for private attributes,
/// the governing private creator string) into a [`DictEntry`].
/// Lookup failures yield `None`,
/// which readers interpret as an unknown (UN) attribute.
pub trait DataDictionary {
    /// Fetch the entry for the given tag.
    fn by_tag(&self, tag: Tag) -> Option<&DictEntry>;

    /// Fetch the entry for the given tag under the given private creator.
    ///
    /// The default implementation ignores the creator and falls back to
    /// [`by_tag`](DataDictionary::by_tag); dictionaries carrying private
    /// vendor blocks may override it.
    fn by_tag_with_creator(&self, tag: Tag, _creator: Option<&str>) -> Option<&DictEntry> {
        self.by_tag(tag)
    }
}

impl<T: DataDictionary + ?Sized> DataDictionary for &T {
    fn by_tag(&self, tag: Tag) -> Option<&DictEntry> {
        (**self).by_tag(tag)
    }

    fn by_tag_with_creator(&self, tag: Tag, creator: Option<&str>) -> Option<&DictEntry> {
        (**self).by_tag_with_creator(tag, creator)
    }
}

/// An attribute dictionary which knows nothing.
///
/// Useful for testing the codec layers without carrying
/// the standard dictionary around.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubDataDictionary;

impl DataDictionary for StubDataDictionary {
    fn by_tag(&self, _: Tag) -> Option<&DictEntry> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_vr_resolution() {
        assert_eq!(VirtualVr::Exact(VR::UI).exact(), Some(VR::UI));
        assert_eq!(VirtualVr::ObOw.exact(), None);
        assert_eq!(VirtualVr::ObOw.relaxed(), VR::OW);
        assert_eq!(VirtualVr::UsSs.relaxed(), VR::US);
    }

    #[test]
    fn stub_knows_nothing() {
        let dict = StubDataDictionary;
        assert!(dict.by_tag(Tag(0x0008, 0x0018)).is_none());
        assert!(dict
            .by_tag_with_creator(Tag(0x0009, 0x1001), Some("ACME 1.1"))
            .is_none());
    }
}
