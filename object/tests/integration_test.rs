//! End-to-end file reading and rewriting tests over temporary files.

use dcmio_core::dataset::{
    DataElement, DataSet, Fragment, Item, SequenceOfFragments, SequenceOfItems,
};
use dcmio_core::{Length, Tag, VR};
use dcmio_encoding::transfer_syntax::TransferSyntax;
use dcmio_object::{open_file, DicomFile, FileMetaTableBuilder};

fn sample_file(ts: TransferSyntax) -> DicomFile {
    let meta = FileMetaTableBuilder::new()
        .information_version([0x00, 0x01])
        .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
        .media_storage_sop_instance_uid("1.2.276.0.7230010.3.1.4.123456")
        .transfer_syntax(ts.uid().expect("test transfer syntax must have a UID"))
        .implementation_class_uid("1.2.3.0.1")
        .build()
        .unwrap();

    let mut nested = DataSet::new(ts.encoding_mode());
    nested.put(DataElement::new(
        Tag(0x0008, 0x1155),
        VR::UI,
        b"1.2.3.9\0".to_vec(),
    ));
    let mut items = SequenceOfItems::empty();
    items.push(Item::new(Length::UNDEFINED, nested));

    let mut dataset = DataSet::new(ts.encoding_mode());
    dataset.put(DataElement::new(
        Tag(0x0008, 0x0018),
        VR::UI,
        b"1.2.276.0.7230010.3.1.4.123456\0".to_vec(),
    ));
    dataset.put(DataElement::new(
        Tag(0x0008, 0x0060),
        VR::CS,
        b"OT".to_vec(),
    ));
    dataset.put(DataElement::new_sequence(Tag(0x0008, 0x1140), items));
    dataset.put(DataElement::new(
        Tag(0x0028, 0x0010),
        VR::US,
        vec![0x02, 0x00],
    ));
    dataset.put(DataElement::new(
        Tag(0x0028, 0x0011),
        VR::US,
        vec![0x02, 0x00],
    ));

    DicomFile::new(Some([0u8; 128]), Some(meta), dataset, ts)
}

#[test]
fn open_and_rewrite_explicit_le_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("explicit_le.dcm");
    let rewritten = dir.path().join("explicit_le_copy.dcm");

    let file = sample_file(TransferSyntax::ExplicitVRLittleEndian);
    file.save(&path).unwrap();

    let read_back = open_file(&path).unwrap();
    assert_eq!(
        read_back.transfer_syntax(),
        TransferSyntax::ExplicitVRLittleEndian
    );
    assert_eq!(
        read_back.dataset.element_bytes(Tag(0x0008, 0x0060)),
        Some(&b"OT"[..])
    );

    // a structural rewrite must be byte-stable
    read_back.save(&rewritten).unwrap();
    let original = std::fs::read(&path).unwrap();
    let copy = std::fs::read(&rewritten).unwrap();
    assert_eq!(original, copy);
}

#[test]
fn open_and_rewrite_implicit_le_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("implicit_le.dcm");
    let rewritten = dir.path().join("implicit_le_copy.dcm");

    let file = sample_file(TransferSyntax::ImplicitVRLittleEndian);
    file.save(&path).unwrap();

    let read_back = open_file(&path).unwrap();
    assert_eq!(
        read_back.transfer_syntax(),
        TransferSyntax::ImplicitVRLittleEndian
    );
    // the dictionary resolves the VR on re-read
    assert_eq!(
        read_back.dataset.element(Tag(0x0028, 0x0010)).unwrap().vr(),
        VR::US
    );

    read_back.save(&rewritten).unwrap();
    let original = std::fs::read(&path).unwrap();
    let copy = std::fs::read(&rewritten).unwrap();
    assert_eq!(original, copy);
}

#[test]
fn open_encapsulated_file_with_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rle.dcm");

    let mut file = sample_file(TransferSyntax::RleLossless);
    file.dataset.put(DataElement::new_fragments(
        Tag(0x7FE0, 0x0010),
        VR::OB,
        SequenceOfFragments::new(vec![], vec![Fragment(vec![0xAB; 16])]),
    ));
    file.save(&path).unwrap();

    let read_back = open_file(&path).unwrap();
    assert_eq!(read_back.transfer_syntax(), TransferSyntax::RleLossless);
    let frags = read_back
        .dataset
        .element(Tag(0x7FE0, 0x0010))
        .and_then(|e| e.value().as_fragments())
        .expect("pixel data should be fragmented");
    assert_eq!(frags.number_of_fragments(), 1);
    assert_eq!(frags.combined_buffer(16).unwrap(), vec![0xAB; 16]);
}
