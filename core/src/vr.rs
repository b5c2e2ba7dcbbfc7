//! Value representation enumeration and its encoding properties.

use std::fmt;
use std::str::{from_utf8, FromStr};

/// An enum type for a DICOM value representation.
///
/// The variants cover the value representations admitted by the
/// 2006 edition of the standard. Context-dependent representations
/// (such as _OB or OW_) are described separately by
/// [`VirtualVr`](crate::dictionary::VirtualVr),
/// since they may only appear in dictionary entries, never on the wire.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Double
    FD,
    /// Floating Point Single
    FL,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Float
    OF,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Time
    TM,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_string(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FD => "FD",
            FL => "FL",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OF => "OF",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            TM => "TM",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            US => "US",
            UT => "UT",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    /// The function returns two alphabetic characters in upper case.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_string().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Whether values of this representation are encoded as
    /// backslash-delimited character data.
    pub fn is_ascii(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UI | UT
        )
    }

    /// Whether values of this representation are encoded as
    /// fixed-width binary scalars, and are therefore sensitive
    /// to the stream's byte order.
    pub fn is_binary(self) -> bool {
        !self.is_ascii()
    }

    /// Whether this representation uses the extended explicit header form:
    /// two reserved bytes followed by a 32-bit value length field.
    /// All other representations use a 16-bit value length field.
    pub fn has_long_header(self) -> bool {
        use VR::*;
        matches!(self, OB | OW | OF | SQ | UN | UT)
    }

    /// The byte width of one encoded scalar of this representation,
    /// for the purpose of byte order swapping.
    /// Representations without a scalar interpretation report 1,
    /// meaning that their value bytes are insensitive to byte order.
    pub fn scalar_width(self) -> usize {
        use VR::*;
        match self {
            AT | OW | SS | US => 2,
            FL | OF | SL | UL => 4,
            FD => 8,
            _ => 1,
        }
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two UTF-8 encoded alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> std::result::Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FD" => Ok(FD),
            "FL" => Ok(FL),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OF" => Ok(OF),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "TM" => Ok(TM),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "US" => Ok(US),
            "UT" => Ok(UT),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(VR::to_string(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vr_from_binary() {
        assert_eq!(VR::from_binary([b'U', b'I']), Some(VR::UI));
        assert_eq!(VR::from_binary([b'O', b'B']), Some(VR::OB));
        assert_eq!(VR::from_binary([b'Z', b'Z']), None);
        // value bytes from an implicit VR stream are not a VR
        assert_eq!(VR::from_binary([0x04, 0x00]), None);
    }

    #[test]
    fn vr_header_classes() {
        // the extended header representations
        for vr in [VR::OB, VR::OW, VR::OF, VR::SQ, VR::UN, VR::UT] {
            assert!(vr.has_long_header(), "{} must use a 32-bit length", vr);
        }
        // a sample of short header representations
        for vr in [VR::AE, VR::CS, VR::DS, VR::PN, VR::SS, VR::UI, VR::US] {
            assert!(!vr.has_long_header(), "{} must use a 16-bit length", vr);
        }
    }

    #[test]
    fn vr_encoding_classes() {
        assert!(VR::UI.is_ascii());
        assert!(VR::PN.is_ascii());
        assert!(VR::IS.is_ascii());
        assert!(VR::US.is_binary());
        assert!(VR::OW.is_binary());
        assert!(VR::SQ.is_binary());
        assert_eq!(VR::US.scalar_width(), 2);
        assert_eq!(VR::UL.scalar_width(), 4);
        assert_eq!(VR::FD.scalar_width(), 8);
        assert_eq!(VR::OB.scalar_width(), 1);
        assert_eq!(VR::UI.scalar_width(), 1);
    }
}
