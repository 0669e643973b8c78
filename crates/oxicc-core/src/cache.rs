//! Profile Context and Cache
//!
//! [`ProfileContext`] is the explicit home of everything that would
//! otherwise be process global: the search directories, the loaded profile
//! cache and the list of known profile files. Create one per process (or per
//! test) and pass it around; dropping it releases all cached profiles.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use crate::config::{LoadFlags, RankPolicy, SearchPaths};
use crate::icc::TagSignature;
use crate::identity::ProfileId;
use crate::matching::match_pattern;
use crate::profile::Profile;
use crate::profiles::ProfileList;
use crate::{Error, Result};

const PROFILE_EXTENSIONS: [&str; 2] = ["icc", "icm"];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A loaded profile and the modification time of its file at load
#[derive(Debug)]
struct CacheEntry {
    mtime: Option<SystemTime>,
    profile: Arc<Profile>,
}

impl CacheEntry {
    fn is_fresh(&self, path: &Path, skip_mtime_check: bool) -> bool {
        skip_mtime_check || self.mtime == modified(path)
    }
}

/// Search paths, loaded profiles and known profile files
#[derive(Debug, Default)]
pub struct ProfileContext {
    search_paths: SearchPaths,
    policy: RankPolicy,
    cache: Mutex<HashMap<PathBuf, CacheEntry>>,
    known_files: Mutex<Option<Arc<[PathBuf]>>>,
}

impl ProfileContext {
    pub fn new(search_paths: SearchPaths) -> Self {
        Self {
            search_paths,
            ..Self::default()
        }
    }

    /// Context using the directories from the environment
    pub fn from_env() -> Self {
        Self::new(SearchPaths::from_env())
    }

    pub fn with_policy(mut self, policy: RankPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    pub fn policy(&self) -> &RankPolicy {
        &self.policy
    }

    /// Load a profile by name or path, going through the cache
    ///
    /// Relative names are searched in the configured directories, then in
    /// the current directory. The cache holds one entry per resolved path;
    /// an entry whose file changed since it was loaded is a miss unless
    /// `flags.skip_mtime_check` is set, and the reload replaces it.
    pub fn from_file(&self, name: &Path, flags: LoadFlags) -> Result<Arc<Profile>> {
        if name.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("empty profile name".to_string()));
        }
        let path = self
            .search_paths
            .resolve(name)
            .ok_or_else(|| Error::NotFound(name.display().to_string()))?;

        if !flags.no_cache_read {
            let hit = lock(&self.cache)
                .get(&path)
                .filter(|entry| entry.is_fresh(&path, flags.skip_mtime_check))
                .map(|entry| Arc::clone(&entry.profile));
            if let Some(profile) = hit {
                log::debug!("cache hit for {}", path.display());
                let major = profile.version().major;
                if !flags.accepts_version(major) {
                    return Err(Error::VersionFiltered { found: major });
                }
                return Ok(profile);
            }
        }

        let profile = Arc::new(Profile::read_file(&path, flags)?);

        if !flags.no_cache_write {
            // after a possible ID repair the file has a new mtime
            let entry = CacheEntry {
                mtime: modified(&path),
                profile: Arc::clone(&profile),
            };
            lock(&self.cache).insert(path, entry);
        }
        Ok(profile)
    }

    /// Number of cached profiles
    pub fn cached(&self) -> usize {
        lock(&self.cache).len()
    }

    /// Drop all cached profiles and the known file list
    pub fn clear(&self) {
        lock(&self.cache).clear();
        *lock(&self.known_files) = None;
    }

    /// All '.icc' and '.icm' files below the search directories
    ///
    /// A file name found in an earlier directory hides the same name in
    /// later ones. The list is computed once and kept until [`Self::clear`].
    pub fn list_profile_files(&self) -> Arc<[PathBuf]> {
        let mut known = lock(&self.known_files);
        if let Some(files) = known.as_ref() {
            return Arc::clone(files);
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for dir in self.search_paths.dirs() {
            collect_profile_files(dir, &mut files);
        }

        let mut seen = std::collections::HashSet::new();
        files.retain(|path| seen.insert(path.file_name().map(|n| n.to_os_string())));
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        log::debug!("found {} profile files", files.len());

        let files: Arc<[PathBuf]> = files.into();
        *known = Some(Arc::clone(&files));
        files
    }

    /// Known profiles matching any of `patterns`, all without patterns
    ///
    /// Files failing to load are skipped. Profiles with an ID seen before
    /// are dropped unless `flags.allow_duplicates` is set. The list is
    /// ordered by description, ignoring case.
    pub fn profiles(&self, patterns: &[Profile], flags: LoadFlags) -> ProfileList {
        let mut seen = std::collections::HashSet::new();
        let mut found: Vec<Arc<Profile>> = Vec::new();

        for path in self.list_profile_files().iter() {
            let profile = match self.from_file(path, flags) {
                Ok(profile) => profile,
                Err(err) => {
                    log::debug!("skipping {}: {err}", path.display());
                    continue;
                }
            };

            let wanted = patterns.is_empty()
                || patterns
                    .iter()
                    .any(|pattern| match_pattern(pattern, &profile, &self.policy));
            if !wanted {
                continue;
            }
            if !flags.allow_duplicates && !seen.insert(profile.identity(false)) {
                log::debug!("{} duplicates an earlier profile", path.display());
                continue;
            }
            found.push(profile);
        }

        found.sort_by_cached_key(|profile| {
            profile.description().unwrap_or_default().to_lowercase()
        });
        ProfileList::from(found)
    }

    /// Known profile with the given identity
    pub fn from_md5(&self, id: &ProfileId, flags: LoadFlags) -> Option<Arc<Profile>> {
        self.list_profile_files().iter().find_map(|path| {
            let profile = self.from_file(path, flags).ok()?;
            (profile.identity(false) == *id).then_some(profile)
        })
    }

    /// File holding a profile identical to `profile`
    pub fn find_file_name_for(&self, profile: &Profile) -> Option<PathBuf> {
        if let Some(own) = profile.file_name().filter(|path| path.is_file()) {
            return Some(own.to_path_buf());
        }
        let id = profile.identity(false);
        self.from_md5(&id, LoadFlags::default())
            .and_then(|found| found.file_name().map(Path::to_path_buf))
    }

    /// File of the profile at `pos` of a device link's profile sequence
    ///
    /// Entries are matched by their ID, or by description when the ID is
    /// not set.
    pub fn find_file_name_in_sequence(&self, link: &Profile, pos: usize) -> Option<PathBuf> {
        let sequence = link
            .tag_by_signature(TagSignature::PROFILE_SEQUENCE_ID)?
            .data()
            .as_sequence()?;
        let entry = sequence.entries.get(pos)?;

        let id = ProfileId(entry.profile_id);
        let found = if id.is_zero() {
            let description = entry.description.best("en", "US")?.to_string();
            self.list_profile_files().iter().find_map(|path| {
                let profile = self.from_file(path, LoadFlags::default()).ok()?;
                (profile.description().as_deref() == Some(description.as_str())).then_some(profile)
            })
        } else {
            self.from_md5(&id, LoadFlags::default())
        };
        found.and_then(|profile| profile.file_name().map(Path::to_path_buf))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn collect_profile_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_profile_files(&path, files);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                PROFILE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
        {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::icc::{ColorSpace, ProfileVersion, SignatureKind};

    fn write_profile(dir: &Path, name: &str, description: &str, color_space: ColorSpace) {
        let mut profile = Profile::from_color_space(color_space);
        profile.set_signature(SignatureKind::Version, ProfileVersion::V4_3.to_u32());
        profile.add_text(TagSignature::DESC, description).unwrap();
        profile.write_to_file(&dir.join(name)).unwrap();
    }

    fn context(dir: &Path) -> ProfileContext {
        ProfileContext::new(SearchPaths::new(vec![dir.to_path_buf()]))
    }

    #[test]
    fn test_from_file_caches() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "a.icc", "Alpha", ColorSpace::Rgb);
        let ctx = context(dir.path());

        let first = ctx.from_file(Path::new("a.icc"), LoadFlags::default()).unwrap();
        let second = ctx.from_file(Path::new("a.icc"), LoadFlags::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.cached(), 1);

        let fresh = ctx.from_file(Path::new("a.icc"), LoadFlags::uncached()).unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(*first, *fresh);

        ctx.clear();
        assert_eq!(ctx.cached(), 0);
    }

    fn touch_later(path: &Path) {
        let file = fs::File::options().write(true).open(path).unwrap();
        let later = file.metadata().unwrap().modified().unwrap() + Duration::from_secs(10);
        file.set_modified(later).unwrap();
    }

    #[test]
    fn test_changed_file_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "a.icc", "Before", ColorSpace::Rgb);
        let ctx = context(dir.path());

        let before = ctx.from_file(Path::new("a.icc"), LoadFlags::default()).unwrap();
        write_profile(dir.path(), "a.icc", "After", ColorSpace::Rgb);
        touch_later(&dir.path().join("a.icc"));

        let after = ctx.from_file(Path::new("a.icc"), LoadFlags::default()).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.description().as_deref(), Some("After"));
        assert_eq!(ctx.cached(), 1);

        let again = ctx.from_file(Path::new("a.icc"), LoadFlags::default()).unwrap();
        assert!(Arc::ptr_eq(&after, &again));
    }

    #[test]
    fn test_skip_mtime_check_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "a.icc", "Before", ColorSpace::Rgb);
        let ctx = context(dir.path());
        let skip = LoadFlags {
            skip_mtime_check: true,
            ..LoadFlags::default()
        };

        let before = ctx.from_file(Path::new("a.icc"), LoadFlags::default()).unwrap();
        write_profile(dir.path(), "a.icc", "After", ColorSpace::Rgb);
        touch_later(&dir.path().join("a.icc"));

        let stale = ctx.from_file(Path::new("a.icc"), skip).unwrap();
        assert!(Arc::ptr_eq(&before, &stale));
        assert_eq!(stale.description().as_deref(), Some("Before"));
        assert_eq!(ctx.cached(), 1);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("short.icc"), [0u8; 20]).unwrap();
        let ctx = context(dir.path());

        assert!(matches!(
            ctx.from_file(Path::new(""), LoadFlags::default()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ctx.from_file(Path::new("missing.icc"), LoadFlags::default()),
            Err(Error::NotFound(_))
        ));
        assert!(ctx.from_file(Path::new("short.icc"), LoadFlags::default()).is_err());
        assert_eq!(ctx.cached(), 0);
    }

    #[test]
    fn test_list_and_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("vendor");
        std::fs::create_dir(&nested).unwrap();
        write_profile(dir.path(), "b.icc", "beta", ColorSpace::Rgb);
        write_profile(&nested, "a.ICM", "Alpha", ColorSpace::Cmyk);
        write_profile(dir.path(), "copy.icc", "beta", ColorSpace::Rgb);
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let ctx = context(dir.path());

        let files = ctx.list_profile_files();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e != "txt")));

        let all = ctx.profiles(&[], LoadFlags::default());
        assert_eq!(all.len(), 2);
        assert_eq!(all.get(0).unwrap().description().as_deref(), Some("Alpha"));

        let with_duplicates = LoadFlags {
            allow_duplicates: true,
            ..LoadFlags::default()
        };
        assert_eq!(ctx.profiles(&[], with_duplicates).len(), 3);

        let rgb = Profile::from_color_space(ColorSpace::Rgb);
        assert_eq!(ctx.profiles(&[rgb], with_duplicates).len(), 2);
    }

    #[test]
    fn test_identity_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "a.icc", "Alpha", ColorSpace::Rgb);
        write_profile(dir.path(), "b.icc", "Beta", ColorSpace::Gray);
        let ctx = context(dir.path());

        let bytes = std::fs::read(dir.path().join("b.icc")).unwrap();
        let detached = Profile::from_bytes(&bytes).unwrap();
        assert!(detached.file_name().is_none());

        let found = ctx.find_file_name_for(&detached).unwrap();
        assert_eq!(found.file_name().unwrap(), "b.icc");

        let id = detached.identity(false);
        assert_eq!(
            ctx.from_md5(&id, LoadFlags::default())
                .unwrap()
                .description()
                .as_deref(),
            Some("Beta")
        );
        assert!(ctx.from_md5(&ProfileId([9; 16]), LoadFlags::default()).is_none());
    }
}
