use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

const NO_SUCH_COMMIT: &str = "No commit with that id exists.";

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self, object_type: ObjectType) -> PathBuf {
        self.path.join(object_type.dir_name())
    }

    pub fn exists(&self, object_type: ObjectType, object_id: &ObjectId) -> bool {
        self.objects_path(object_type)
            .join(object_id.to_path())
            .is_file()
    }

    /// Persist an object and return its id.
    ///
    /// Blobs are content addressed, so storing one that already exists is a
    /// no-op. Commits are write-once and fail with `DuplicateObject`.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_type = object.object_type();
        let object_id = object.object_id()?;
        let object_path = self.path.join(object.object_path()?);

        if object_path.exists() {
            if object_type.is_write_once() {
                return Err(RepositoryError::duplicate_object(format!(
                    "A {object_type} with id {object_id} already exists."
                )));
            }
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, object.serialize()?)?;

        Ok(object_id)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let object_content = self.load(ObjectType::Blob, object_id)?;
        Blob::deserialize(Cursor::new(object_content))
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let object_content = self.load(ObjectType::Commit, object_id)?;
        Commit::deserialize(Cursor::new(object_content)).map_err(|error| {
            RepositoryError::invalid_state(format!("Unable to parse commit {object_id}: {error}"))
        })
    }

    pub fn parse_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        Ok(self
            .parse_object_as_commit(object_id)?
            .to_slim(object_id.clone()))
    }

    pub fn load(&self, object_type: ObjectType, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.objects_path(object_type).join(object_id.to_path());

        if !object_path.is_file() {
            return Err(match object_type {
                ObjectType::Commit => RepositoryError::not_found(NO_SUCH_COMMIT),
                ObjectType::Blob => {
                    RepositoryError::not_found(format!("No blob with id {object_id} exists."))
                }
            });
        }

        self.read_object(object_path)
    }

    /// Resolve a full or abbreviated commit id to the id of a stored commit.
    ///
    /// A full id must name an existing commit. An abbreviated id must be at
    /// least four hex characters long and match exactly one commit.
    pub fn resolve_commit_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if prefix.len() == OBJECT_ID_LENGTH {
            let object_id = ObjectId::try_parse(prefix.to_string())
                .map_err(|_| RepositoryError::not_found(NO_SUCH_COMMIT))?;

            return match self.exists(ObjectType::Commit, &object_id) {
                true => Ok(object_id),
                false => Err(RepositoryError::not_found(NO_SUCH_COMMIT)),
            };
        }

        if !ObjectId::is_valid_prefix(prefix) {
            return Err(RepositoryError::ambiguous_or_not_found(NO_SUCH_COMMIT));
        }

        let mut matches = self.find_objects_by_prefix(ObjectType::Commit, prefix)?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(RepositoryError::ambiguous_or_not_found(NO_SUCH_COMMIT)),
            _ => Err(RepositoryError::ambiguous_or_not_found(format!(
                "Commit id {prefix} is ambiguous."
            ))),
        }
    }

    /// Find all objects of one kind whose id starts with the given prefix.
    ///
    /// Only the shard directory named by the first two characters is scanned.
    /// Returns every match sorted, so several entries mean an ambiguous prefix.
    pub fn find_objects_by_prefix(
        &self,
        object_type: ObjectType,
        prefix: &str,
    ) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let Some(dir_name) = prefix.get(..2) else {
            return Ok(vec![]);
        };

        let dir_path = self.objects_path(object_type).join(dir_name);
        let mut matches = Self::list_shard(&dir_path)?
            .into_iter()
            .filter(|oid| oid.as_ref().starts_with(&prefix))
            .collect::<Vec<_>>();
        matches.sort();

        Ok(matches)
    }

    /// Every commit id in the store, sorted
    pub fn list_commits(&self) -> anyhow::Result<Vec<ObjectId>> {
        let commits_path = self.objects_path(ObjectType::Commit);
        if !commits_path.is_dir() {
            return Ok(vec![]);
        }

        let mut commits = Vec::new();
        for shard in std::fs::read_dir(&commits_path)
            .context(format!("Unable to list {}", commits_path.display()))?
        {
            let shard = shard?;
            if shard.file_type()?.is_dir() {
                commits.extend(Self::list_shard(&shard.path())?);
            }
        }
        commits.sort();

        Ok(commits)
    }

    fn list_shard(dir_path: &Path) -> anyhow::Result<Vec<ObjectId>> {
        if !dir_path.is_dir() {
            return Ok(vec![]);
        }

        let mut object_ids = Vec::new();
        for entry in std::fs::read_dir(dir_path)
            .context(format!("Unable to list {}", dir_path.display()))?
        {
            let file_name = entry?.file_name();
            // temp files and strays do not parse as ids
            if let Ok(oid) = ObjectId::try_parse(file_name.to_string_lossy().to_string()) {
                object_ids.push(oid);
            }
        }

        Ok(object_ids)
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Snapshot;
    use assert_fs::TempDir;
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().to_path_buf().into_boxed_path());
        (dir, database)
    }

    fn commit_with_message(message: &str) -> Commit {
        Commit::new(message.to_string(), 10, vec![], Snapshot::new())
    }

    #[rstest]
    fn storing_a_blob_twice_is_a_cache_hit(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let blob = Blob::new("content\n");

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);
        assert_eq!(database.parse_object_as_blob(&first).unwrap(), blob);
    }

    #[rstest]
    fn storing_a_commit_twice_is_rejected(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let commit = commit_with_message("once");

        database.store(&commit).unwrap();
        let error = database.store(&commit).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::DuplicateObject(_))
        ));
    }

    #[rstest]
    fn stored_commit_reads_back_unchanged(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let commit = Commit::new(
            "with files".to_string(),
            99,
            vec![ObjectId::digest(["parent"])],
            Snapshot::from([(PathBuf::from("a/b.txt"), ObjectId::digest(["blob"]))]),
        );

        let oid = database.store(&commit).unwrap();

        assert_eq!(database.parse_object_as_commit(&oid).unwrap(), commit);
        assert_eq!(database.list_commits().unwrap(), vec![oid]);
    }

    #[rstest]
    fn prefixes_resolve_to_a_unique_commit(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let oid = database.store(&commit_with_message("one")).unwrap();

        assert_eq!(database.resolve_commit_prefix(&oid.as_ref()[..6]).unwrap(), oid);
        assert_eq!(database.resolve_commit_prefix(oid.as_ref()).unwrap(), oid);
    }

    #[rstest]
    #[case::too_short("abc")]
    #[case::not_hex("zzzzzz")]
    #[case::unknown("0000000")]
    fn bad_prefixes_are_ambiguous_or_not_found(
        database: (TempDir, Database),
        #[case] prefix: &str,
    ) {
        let (_dir, database) = database;
        database.store(&commit_with_message("one")).unwrap();

        let error = database.resolve_commit_prefix(prefix).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::AmbiguousOrNotFound(_))
        ));
    }

    #[rstest]
    fn unknown_full_id_is_not_found(database: (TempDir, Database)) {
        let (_dir, database) = database;

        let error = database.resolve_commit_prefix(&"a".repeat(40)).unwrap_err();

        assert_eq!(
            error.downcast_ref::<RepositoryError>(),
            Some(&RepositoryError::NotFound(NO_SUCH_COMMIT.to_string()))
        );
    }

    #[rstest]
    fn blobs_and_commits_live_in_separate_directories(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let blob_oid = database.store(&Blob::new("data")).unwrap();

        assert!(database.exists(ObjectType::Blob, &blob_oid));
        assert!(!database.exists(ObjectType::Commit, &blob_oid));
        assert!(database.parse_object_as_commit(&blob_oid).is_err());
    }

    #[rstest]
    fn unparsable_commit_is_an_invalid_state(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let oid = ObjectId::digest(["garbage"]);
        let object_path = database.objects_path(ObjectType::Commit).join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        database
            .write_object(object_path, Bytes::from("not a commit"))
            .unwrap();

        let error = database.parse_object_as_commit(&oid).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::InvalidState(_))
        ));
    }
}
