//! Track library: one audio track per globe marker.
//!
//! Tracks are built once from the scene configuration and never mutated. The
//! media element reports its `src` as an absolute URL, so track URLs are
//! resolved against the page address at construction time and matched by
//! exact equality afterwards.

use crate::core::config::MarkerDef;
use glam::Vec3;
use std::fmt;

/// Location key identifying a track (e.g. `"paris"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a marker mesh in scene order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub location: String,
    /// Absolute source URL.
    pub url: String,
    pub marker: MarkerId,
    pub lat_deg: f32,
    pub lng_deg: f32,
}

impl Track {
    /// Marker anchor on a sphere of `radius`.
    pub fn anchor(&self, radius: f32) -> Vec3 {
        crate::core::geometry::lat_lng_to_position(self.lat_deg, self.lng_deg, radius)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrackLibrary {
    tracks: Vec<Track>,
}

impl TrackLibrary {
    /// Build the library in marker order, resolving each audio URL against
    /// `page_url` with [`resolve_url`].
    pub fn from_markers(defs: &[MarkerDef], page_url: &str) -> Self {
        Self::from_markers_with(defs, |audio| resolve_url(page_url, audio))
    }

    /// Build the library with a caller-supplied resolver. The browser passes
    /// its own URL parser so track URLs are byte-identical to `media.src`.
    pub fn from_markers_with(defs: &[MarkerDef], resolve: impl Fn(&str) -> String) -> Self {
        let tracks = defs
            .iter()
            .enumerate()
            .map(|(i, d)| Track {
                id: TrackId::new(d.location.clone()),
                title: d.title.clone(),
                location: d.location.clone(),
                url: resolve(&d.audio),
                marker: MarkerId(i),
                lat_deg: d.lat,
                lng_deg: d.lng,
            })
            .collect();
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn by_marker(&self, marker: MarkerId) -> Option<&Track> {
        self.tracks.get(marker.0)
    }

    /// Track whose URL is exactly `src`. Empty `src` never matches.
    pub fn track_for_src(&self, src: &str) -> Option<&Track> {
        if src.is_empty() {
            return None;
        }
        self.tracks.iter().find(|t| t.url == src)
    }
}

/// Resolve `url` against an absolute `base` the way a browser resolves a
/// media `src` attribute: dot segments are removed and characters outside
/// the URL code points are percent-encoded. Query strings and fragments on
/// `base` are dropped.
pub fn resolve_url(base: &str, url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    let (reference, tail) = match url.find(['?', '#']) {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    let reference = reference.replace('\\', "/");

    let (scheme, authority, path) = if let Some((scheme, rest)) = reference.split_once("://") {
        let (authority, path) = split_authority(rest);
        (scheme.to_string(), authority.to_string(), path.to_string())
    } else {
        let base = base.split(['?', '#']).next().unwrap_or(base);
        let Some((scheme, rest)) = base.split_once("://") else {
            return url.to_string();
        };
        if let Some(rest) = reference.strip_prefix("//") {
            let (authority, path) = split_authority(rest);
            (scheme.to_string(), authority.to_string(), path.to_string())
        } else {
            let (authority, base_path) = split_authority(rest);
            let path = if reference.starts_with('/') {
                reference.clone()
            } else if reference.is_empty() {
                base_path.to_string()
            } else {
                let dir = match base_path.rfind('/') {
                    Some(i) => &base_path[..=i],
                    None => "/",
                };
                format!("{}{}", dir, reference)
            };
            (scheme.to_string(), authority.to_string(), path)
        }
    };

    format!(
        "{}://{}{}{}",
        scheme.to_ascii_lowercase(),
        authority,
        percent_encode(&remove_dot_segments(&path), PATH_RESERVED),
        encode_tail(tail)
    )
}

// Printable ASCII that the WHATWG encode sets still escape.
const PATH_RESERVED: &[u8] = b"\"<>`{}";
const QUERY_RESERVED: &[u8] = b"\"<>'";
const FRAGMENT_RESERVED: &[u8] = b"\"<>`";

fn split_authority(rest: &str) -> (&str, &str) {
    match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();
    let last = segments.len() - 1;
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        match *seg {
            "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
        // "a/b/.." resolves to "a/", keeping the trailing slash
        if i == last && matches!(*seg, "." | "..") {
            out.push("");
        }
    }
    format!("/{}", out.join("/"))
}

fn percent_encode(s: &str, reserved: &[u8]) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if b <= 0x20 || b >= 0x7f || reserved.contains(&b) {
            out.push_str(&format!("%{:02X}", b));
        } else {
            out.push(b as char);
        }
    }
    out
}

fn encode_tail(tail: &str) -> String {
    let (query, fragment) = match tail.find('#') {
        Some(i) => tail.split_at(i),
        None => (tail, ""),
    };
    format!(
        "{}{}",
        percent_encode(query, QUERY_RESERVED),
        percent_encode(fragment, FRAGMENT_RESERVED)
    )
}
