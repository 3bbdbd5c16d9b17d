use nextlevel::formats::chunk::{
    CHUNK_SCRIPT, CHUNK_SCRIPT_DATA, CHUNK_SCRIPT_FUNCTION_TABLE, CHUNK_SCRIPT_HEADER, CHUNK_TEXTURE_DATA,
};
use nextlevel::prelude::*;
use nextlevel::script::OpCode;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::tempdir;

fn le32(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// ScriptData holding one float (1.5) stored by `PTR 0; READ 0; MOV_8 4; END`
fn script_data() -> Vec<u8> {
    let code = [
        OpCode::Ptr.encode(0),
        OpCode::Read.encode(0),
        OpCode::Mov8.encode(4),
        OpCode::End.encode(0),
    ];
    let mut out = le32(&[0xC0DE_0001, 8, 4]);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1.5f32.to_bits().to_le_bytes());
    for word in code {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

/// A script module in block 1 and a texture in block 2
fn sample_forest() -> ChunkForest {
    ChunkForest::new(vec![
        ChunkNode::container(
            CHUNK_SCRIPT,
            0,
            0,
            vec![
                ChunkNode::leaf(CHUNK_SCRIPT_HEADER, 0, 0, le32(&[0x1234_5678, 0x40])),
                ChunkNode::leaf(CHUNK_SCRIPT_FUNCTION_TABLE, 0, 8, le32(&[0xF00D, 0, 0])),
                ChunkNode::leaf(CHUNK_SCRIPT_DATA, 0, 20, script_data()),
            ],
        ),
        ChunkNode::leaf(CHUNK_TEXTURE_DATA, 0x1000, 0, vec![0x33; 256]),
    ])
}

#[test]
fn test_write_and_read_back() {
    let dir = tempdir().unwrap();
    let dict = dir.path().join("level.dict");
    let data = dir.path().join("level.data");

    let archive = Archive::from_forest(sample_forest(), true).unwrap();
    archive.write(&dict, &data).unwrap();

    let reopened = Archive::read(&dict, &data).unwrap();
    assert!(reopened.is_compressed());
    assert_eq!(reopened.chunks(), &sample_forest());
    assert_eq!(reopened.dictionary().blocks.len(), 3);

    // saving an opened archive again is stable
    let (dict_bytes, data_bytes) = reopened.save().unwrap();
    assert_eq!(dict_bytes, std::fs::read(&dict).unwrap());
    assert_eq!(data_bytes, std::fs::read(&data).unwrap());
}

#[test]
fn test_decompile_from_archive() {
    let archive = Archive::from_forest(sample_forest(), false).unwrap();
    let mut names = HashNames::new();
    names.insert(0xF00D, "OnLoad");

    let modules = archive.script_modules_with(&names);
    assert_eq!(modules.len(), 1);
    let (path, module) = &modules[0];
    assert_eq!(path.to_string(), "0");

    let module = module.as_ref().unwrap();
    let function = &module.scripts[0].functions[0];
    assert_eq!(function.name, "OnLoad");
    assert_eq!(function.status, DecodeStatus::Complete);
    assert_eq!(function.variables[&4].value, TypedValue::Float(1.5));
    assert!(module.to_code(&names).contains("float var4 = 1.5"));
}

#[test]
fn test_patch_variable_and_repack() {
    let dir = tempdir().unwrap();
    let mut archive = Archive::from_forest(sample_forest(), true).unwrap();
    let names = HashNames::new();

    let (path, module) = archive.script_modules_with(&names).remove(0);
    let mut module = module.unwrap();
    module.patch_variable(0, 0, 4, TypedValue::Float(7.25)).unwrap();

    // in place: same size, nothing moves
    let data_path = path.child(2);
    let mut bytes = archive.chunks().get(&data_path).unwrap().payload().unwrap().to_vec();
    module.write_pool_into(&mut bytes).unwrap();
    archive.set_chunk_payload(&data_path, bytes).unwrap();

    // re-emitted with an extra function: the data chunk grows
    let assembled = module.assemble().unwrap();
    assert_eq!(assembled.data.len(), script_data().len());
    let mut grown = assembled.data.clone();
    grown.extend_from_slice(&[0; 8]);
    archive.set_chunk_payload(&data_path, grown).unwrap();

    archive
        .write(dir.path().join("out.dict"), dir.path().join("out.data"))
        .unwrap();
    let reopened = Archive::read(dir.path().join("out.dict"), dir.path().join("out.data")).unwrap();
    let module = reopened.script_modules_with(&names).remove(0).1.unwrap();
    assert_eq!(module.scripts[0].functions[0].variables[&4].value, TypedValue::Float(7.25));
    assert_eq!(reopened.chunks().get(&data_path).unwrap().size as usize, script_data().len() + 8);
}

#[test]
fn test_switch_storage_mode() {
    let mut archive = Archive::from_forest(sample_forest(), true).unwrap();
    let (_, compressed) = archive.save().unwrap();

    archive.set_compressed(false);
    let (dict, raw) = archive.save().unwrap();
    assert!(raw.len() > compressed.len());

    let reopened = Archive::open(&dict, &raw).unwrap();
    assert!(!reopened.is_compressed());
    assert_eq!(reopened.chunks(), &sample_forest());
}

#[test]
fn test_bad_magic() {
    let archive = Archive::from_forest(sample_forest(), false).unwrap();
    let (mut dict, data) = archive.save().unwrap();
    dict[0] ^= 0xFF;
    let err = Archive::open(&dict, &data).unwrap_err();
    assert!(matches!(err, Error::BadMagic { .. }));
}

fn arb_dictionary() -> impl Strategy<Value = DictionaryIndex> {
    let descriptor = (any::<u32>(), any::<u32>(), any::<u32>(), 0u8..3).prop_map(|(o, d, c, tag)| {
        let mut desc = BlockDescriptor::new(o, d, c);
        desc.usage_tag = tag;
        desc
    });
    (
        any::<bool>(),
        prop::collection::vec(descriptor, 0..8),
        prop::collection::vec(any::<[u8; 8]>(), 0..4),
        prop::collection::vec("[a-z.]{1,8}", 0..3),
        prop::collection::vec(any::<u8>(), 0..16),
    )
        .prop_map(|(compressed, blocks, refs, names, trailer)| {
            let mut index = DictionaryIndex::new(compressed);
            index.blocks = blocks;
            index.table_refs = refs.concat();
            index.names = names;
            index.trailer = trailer;
            index
        })
}

proptest! {
    #[test]
    fn prop_dictionary_round_trip(index in arb_dictionary()) {
        let bytes = index.save().unwrap();
        let loaded = DictionaryIndex::load(&bytes).unwrap();
        prop_assert_eq!(&loaded, &index);
        prop_assert_eq!(loaded.save().unwrap(), bytes);
    }
}
