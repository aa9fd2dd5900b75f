use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;
use std::path::PathBuf;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Identity of the object. Blobs hash their content, commits hash their
    /// message, timestamp and snapshot, so each kind supplies its own digest.
    fn object_id(&self) -> Result<ObjectId>;

    /// Path relative to the repository root where the object is persisted
    fn object_path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(self.object_type().dir_name()).join(self.object_id()?.to_path()))
    }
}
