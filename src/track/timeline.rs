use super::Track;
use crate::midi::Event;

/// Several tracks read as one stream of events.
///
/// Events sharing a tick come out in track order, then in insertion order
/// within their track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    tracks: Vec<Track>,
}

fn merged<'a>(per_track: impl Iterator<Item = &'a Event>) -> Vec<&'a Event> {
    let mut found: Vec<&Event> = per_track.collect();
    // Stable, so track and insertion order survive among equal ticks.
    found.sort_by_key(|evt| evt.tick);
    found
}

impl Timeline {
    pub fn new(tracks: Vec<Track>) -> Self {
        Timeline { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_inner(self) -> Vec<Track> {
        self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(Track::is_empty)
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.tracks.iter().filter_map(Track::last_tick).max()
    }

    pub fn find_events_in_range(&self, start: u64, end: u64) -> Vec<&Event> {
        merged(
            self.tracks
                .iter()
                .flat_map(|track| track.find_events_in_range(start, end)),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        merged(self.tracks.iter().flat_map(Track::iter)).into_iter()
    }
}
