//! Chunk type registry
//!
//! The tree model only needs the IDs to label nodes and to locate the
//! script family; every other family is navigated generically.

pub type ChunkTypeId = u16;

pub const CHUNK_FILE_TABLE: ChunkTypeId = 0x0001;
pub const CHUNK_ROOM: ChunkTypeId = 0x0010;
pub const CHUNK_TEXTURE_BUNDLES: ChunkTypeId = 0x0020;
pub const CHUNK_MODEL_BUNDLES: ChunkTypeId = 0x0021;
pub const CHUNK_CUTSCENE: ChunkTypeId = 0x0030;
pub const CHUNK_CONFIG: ChunkTypeId = 0x0031;
pub const CHUNK_VIDEO: ChunkTypeId = 0x1200;
pub const CHUNK_FILE_HEADER: ChunkTypeId = 0x1301;
pub const CHUNK_ANIMATION_BUNDLES: ChunkTypeId = 0x1302;
pub const CHUNK_AUDIO_BANKS: ChunkTypeId = 0x3000;
pub const CHUNK_EFFECTS: ChunkTypeId = 0x4000;

pub const CHUNK_SCRIPT: ChunkTypeId = 0x5000;
pub const CHUNK_SCRIPT_HASH_BUNDLE: ChunkTypeId = 0x5011;
pub const CHUNK_SCRIPT_DATA: ChunkTypeId = 0x5012;
pub const CHUNK_SCRIPT_HEADER: ChunkTypeId = 0x5013;
pub const CHUNK_SCRIPT_FUNCTION_TABLE: ChunkTypeId = 0x5014;
pub const CHUNK_SCRIPT_STRING_HASHES: ChunkTypeId = 0x5015;

pub const CHUNK_GAME_OBJECT_DB: ChunkTypeId = 0x6500;
pub const CHUNK_GAME_OBJECT: ChunkTypeId = 0x6510;

pub const CHUNK_ANIMATION_DATA: ChunkTypeId = 0x7000;
pub const CHUNK_FONT: ChunkTypeId = 0x7010;
pub const CHUNK_FONT_DATA: ChunkTypeId = 0x7011;
pub const CHUNK_FONT_TEXTURES: ChunkTypeId = 0x7012;
pub const CHUNK_MESSAGE_DATA: ChunkTypeId = 0x7020;
pub const CHUNK_SKELETON: ChunkTypeId = 0x7100;

pub const CHUNK_MODEL: ChunkTypeId = 0xB000;
pub const CHUNK_SKIN_CONTROLLER: ChunkTypeId = 0xB100;
pub const CHUNK_MATERIAL_EFFECTS: ChunkTypeId = 0xB300;
pub const CHUNK_SHADER_DATA: ChunkTypeId = 0xB400;
pub const CHUNK_TEXTURE: ChunkTypeId = 0xB500;
pub const CHUNK_TEXTURE_HEADER: ChunkTypeId = 0xB501;
pub const CHUNK_TEXTURE_DATA: ChunkTypeId = 0xB502;

pub const CHUNK_COLLISION_STATIC: ChunkTypeId = 0xC107;
pub const CHUNK_HITBOXES: ChunkTypeId = 0xC300;
pub const CHUNK_HAVOK_PHYSICS: ChunkTypeId = 0xC900;
pub const CHUNK_HITBOX_RIGGED: ChunkTypeId = 0xD000;
pub const CHUNK_CLOTH_PHYSICS: ChunkTypeId = 0xE000;

/// Known chunk IDs and their display names.
///
/// Where the game reuses an ID across families, the most common name is used.
const CHUNK_TYPE_NAMES: &[(ChunkTypeId, &str)] = &[
    (CHUNK_FILE_TABLE, "FileTable"),
    (CHUNK_ROOM, "Room"),
    (CHUNK_TEXTURE_BUNDLES, "TextureBundles"),
    (CHUNK_MODEL_BUNDLES, "ModelBundles"),
    (CHUNK_CUTSCENE, "CutsceneNLB"),
    (CHUNK_CONFIG, "Config"),
    (CHUNK_VIDEO, "Video"),
    (CHUNK_FILE_HEADER, "FileHeader"),
    (CHUNK_ANIMATION_BUNDLES, "AnimationBundles"),
    (CHUNK_AUDIO_BANKS, "AudioBanks"),
    (CHUNK_EFFECTS, "Effects"),
    (CHUNK_SCRIPT, "Script"),
    (CHUNK_SCRIPT_HASH_BUNDLE, "ScriptHashBundle"),
    (CHUNK_SCRIPT_DATA, "ScriptData"),
    (CHUNK_SCRIPT_HEADER, "ScriptHeader"),
    (CHUNK_SCRIPT_FUNCTION_TABLE, "ScriptFunctionTable"),
    (CHUNK_SCRIPT_STRING_HASHES, "ScriptStringHashes"),
    (CHUNK_GAME_OBJECT_DB, "GameObjectDB"),
    (0x6501, "GameObjectDBScriptHashTable"),
    (0x6502, "GameObjectDBHashScriptIndexTable"),
    (0x6503, "GameObjectDBScriptHash"),
    (CHUNK_GAME_OBJECT, "GameObject"),
    (0x6511, "GameObjectScriptHash"),
    (0x6512, "GameObjectComponentOffsets"),
    (0x6513, "GameObjectComponentHashes"),
    (0x6514, "GameObjectComponentList"),
    (0x6515, "GameObjectParentHash"),
    (CHUNK_ANIMATION_DATA, "AnimationData"),
    (0x7001, "UILayoutHeader"),
    (0x7002, "UILayoutData"),
    (0x7003, "UILayout"),
    (CHUNK_FONT, "Font"),
    (CHUNK_FONT_DATA, "FontData"),
    (CHUNK_FONT_TEXTURES, "FontTextures"),
    (CHUNK_MESSAGE_DATA, "MessageData"),
    (CHUNK_SKELETON, "Skeleton"),
    (0x7101, "SkeletonHeader"),
    (0x7102, "SkeletonBoneInfo"),
    (0x7103, "SkeletonBoneTransform"),
    (0x7104, "SkeletonBoneIndexList"),
    (0x7105, "SkeletonBoneHashList"),
    (0x7106, "SkeletonBoneParenting"),
    (0x9501, "VAND"),
    (CHUNK_MODEL, "Model"),
    (0xB001, "ModelTransform"),
    (0xB002, "ModelInfo"),
    (0xB003, "MeshInfo"),
    (0xB004, "VertexStartPointers"),
    (0xB005, "MeshBuffers"),
    (0xB006, "MaterialData"),
    (0xB007, "MaterialLookupTable"),
    (0xB008, "BoundingRadius"),
    (0xB009, "BoundingBox"),
    (0xB00A, "MeshMorphInfos"),
    (0xB00B, "MeshMorphIndexBuffer"),
    (0xB00C, "ModelUnknownSection"),
    (CHUNK_SKIN_CONTROLLER, "SkinControllerStart"),
    (0xB101, "SkinBindingModelAssign"),
    (0xB102, "SkinMatrices"),
    (0xB103, "SkinHashes"),
    (CHUNK_MATERIAL_EFFECTS, "MaterialEffects"),
    (0xB310, "MaterialParams"),
    (0xB320, "MaterialShaders"),
    (0xB321, "MaterialRasterizerConfig"),
    (0xB322, "MaterialDepthConfig"),
    (0xB323, "MaterialBlendConfig"),
    (0xB325, "MaterialShaderHeader"),
    (0xB326, "MaterialShaderName"),
    (0xB327, "MaterialParameterIndices"),
    (0xB328, "MaterialParameterOffsets"),
    (0xB329, "MaterialShaderAttrLocations"),
    (0xB32A, "MaterialShaderAttrLocationOffsets"),
    (0xB32B, "MaterialShaderProgramLocations"),
    (0xB32D, "MaterialShaderProgramOffsets"),
    (0xB32E, "MaterialShaderUnknown"),
    (0xB330, "MaterialVariation"),
    (0xB331, "ShaderProgramRenderParams"),
    (0xB332, "ShaderProgramHeader"),
    (0xB333, "ShaderProgramLocationOffsets"),
    (0xB334, "ShaderProgramLocIndices"),
    (0xB335, "ShaderProgramLocFlags"),
    (0xB337, "ShaderProgramHashes"),
    (CHUNK_SHADER_DATA, "ShaderData"),
    (0xB401, "ShaderA"),
    (0xB402, "ShaderB"),
    (0xB404, "ShaderConstants"),
    (CHUNK_TEXTURE, "Texture"),
    (CHUNK_TEXTURE_HEADER, "TextureHeader"),
    (CHUNK_TEXTURE_DATA, "TextureData"),
    (0xC100, "CollisionDataStart"),
    (0xC101, "CollisionHeader"),
    (0xC102, "CollisionSearch"),
    (0xC103, "CollisionSearchTriIndices"),
    (CHUNK_COLLISION_STATIC, "CollisionStatic"),
    (0xC110, "CollisionVertexPositions"),
    (0xC111, "CollisionTriIndices"),
    (0xC112, "CollisionTriNormals"),
    (0xC113, "CollisionTriNormalIndices"),
    (0xC114, "CollisionMaterialHashes"),
    (0xC115, "CollisionTriMaterialIndices"),
    (0xC116, "CollisionTriPropertyIndices"),
    (CHUNK_HITBOXES, "Hitboxes"),
    (0xC301, "HitboxObjects"),
    (0xC302, "HitboxObjectParams"),
    (CHUNK_HAVOK_PHYSICS, "HavokPhysics"),
    (0xC901, "PhysicData2"),
    (CHUNK_HITBOX_RIGGED, "HitboxRigged"),
    (0xD001, "HitboxRiggedHeader"),
    (0xD002, "HitboxRiggedData"),
    (CHUNK_CLOTH_PHYSICS, "ClothPhysics"),
];

/// Get the display name for a chunk type ID
#[must_use]
pub fn get_chunk_type_name(type_id: ChunkTypeId) -> Option<&'static str> {
    CHUNK_TYPE_NAMES
        .iter()
        .find(|(id, _)| *id == type_id)
        .map(|(_, name)| *name)
}

/// Get the chunk type ID for a display name (case-insensitive)
#[must_use]
pub fn chunk_type_name_to_id(name: &str) -> Option<ChunkTypeId> {
    CHUNK_TYPE_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(id, _)| *id)
}

/// Display label for any ID, `Unknown (0xNNNN)` when it is not registered
#[must_use]
pub fn chunk_type_label(type_id: ChunkTypeId) -> String {
    get_chunk_type_name(type_id).map_or_else(
        || format!("Unknown ({type_id:#06X})"),
        str::to_string,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_ids_agree() {
        for (id, name) in CHUNK_TYPE_NAMES {
            assert_eq!(chunk_type_name_to_id(name), Some(*id), "{name}");
            assert_eq!(get_chunk_type_name(*id), Some(*name));
        }
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(chunk_type_label(CHUNK_SCRIPT_DATA), "ScriptData");
        assert_eq!(chunk_type_label(0x1234), "Unknown (0x1234)");
        assert_eq!(chunk_type_name_to_id("fontdata"), Some(CHUNK_FONT_DATA));
    }
}
