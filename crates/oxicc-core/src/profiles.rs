//! Profile Lists

use std::ops::Index;
use std::sync::Arc;

use crate::config::RankPolicy;
use crate::matching::{Device, match_pattern, rank_profile};
use crate::profile::Profile;

/// Ordered list of shared profiles
#[derive(Debug, Clone, Default)]
pub struct ProfileList {
    profiles: Vec<Arc<Profile>>,
}

impl ProfileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, profile: Arc<Profile>) {
        self.profiles.push(profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Arc<Profile>> {
        self.profiles.get(pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Profile>> {
        self.profiles.iter()
    }

    pub fn into_vec(self) -> Vec<Arc<Profile>> {
        self.profiles
    }

    /// Profiles matching `pattern`, order kept
    pub fn filter(&self, pattern: &Profile, policy: &RankPolicy) -> Self {
        self.profiles
            .iter()
            .filter(|profile| match_pattern(pattern, profile, policy))
            .cloned()
            .collect()
    }

    /// Sort by rank for `device`, best first
    ///
    /// Returns the ranks in the new list order. Equal ranks keep their
    /// previous relative order.
    pub fn device_rank(&mut self, device: &Device, policy: &RankPolicy) -> Vec<i32> {
        let mut ranked: Vec<(i32, Arc<Profile>)> = self
            .profiles
            .drain(..)
            .map(|profile| (rank_profile(device, &profile, policy), profile))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let (ranks, profiles) = ranked.into_iter().unzip();
        self.profiles = profiles;
        ranks
    }
}

impl From<Vec<Arc<Profile>>> for ProfileList {
    fn from(profiles: Vec<Arc<Profile>>) -> Self {
        Self { profiles }
    }
}

impl FromIterator<Arc<Profile>> for ProfileList {
    fn from_iter<I: IntoIterator<Item = Arc<Profile>>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for ProfileList {
    type Output = Arc<Profile>;

    fn index(&self, pos: usize) -> &Self::Output {
        &self.profiles[pos]
    }
}

impl<'a> IntoIterator for &'a ProfileList {
    type Item = &'a Arc<Profile>;
    type IntoIter = std::slice::Iter<'a, Arc<Profile>>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}
