//! Result ranking: card records → ordered or flattened [`CandidateCard`]s.
//!
//! Two policies exist (see [`RankingPolicy`]):
//!
//! * **Single winner** — drop records without art, stable-sort the rest with
//!   [`compare_preference`], keep the first.
//! * **All faces** — no ranking, no dedup: every face of every record becomes
//!   a candidate, art or not. Art-less faces are reported by the downloader.

use crate::config::RankingPolicy;
use crate::search::CardRecord;
use std::cmp::Ordering;

/// Artist recorded when neither face nor record names one.
pub const UNKNOWN_ARTIST: &str = "UNKNOWN";

/// One downloadable face of a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCard {
    pub name: String,
    pub artist: String,
    pub set_code: String,
    /// Art-crop URI; `None` means the candidate cannot be downloaded.
    pub image_uri: Option<String>,
}

/// Art a record can be downloaded with: its own art crop, else its first
/// face's (double-faced cards keep images on the faces only).
fn primary_art(record: &CardRecord) -> Option<&str> {
    record.art_crop().or_else(|| {
        record
            .card_faces
            .as_ref()
            .and_then(|faces| faces.first())
            .and_then(|face| face.art_crop())
    })
}

/// Strict preference order between two records. `Less` means `a` is preferred.
///
/// Keys, most significant first:
/// 1. has a usable art crop
/// 2. not textless
/// 3. not promo
/// 4. not full art
/// 5. not a variation
/// 6. high-resolution image
/// 7. newest release date (unknown dates last)
///
/// Records equal on every key compare `Equal`, so a stable sort keeps their
/// input order.
pub fn compare_preference(a: &CardRecord, b: &CardRecord) -> Ordering {
    let has_art = |r: &CardRecord| primary_art(r).is_some();

    has_art(b)
        .cmp(&has_art(a))
        .then_with(|| a.textless.cmp(&b.textless))
        .then_with(|| a.promo.cmp(&b.promo))
        .then_with(|| a.full_art.cmp(&b.full_art))
        .then_with(|| a.variation.cmp(&b.variation))
        .then_with(|| b.highres_image.cmp(&a.highres_image))
        .then_with(|| b.released_at.cmp(&a.released_at))
}

/// Drop records without art and sort the rest, best first.
pub fn rank_records(records: Vec<CardRecord>) -> Vec<CardRecord> {
    let mut ranked: Vec<CardRecord> = records
        .into_iter()
        .filter(|r| primary_art(r).is_some())
        .collect();
    ranked.sort_by(compare_preference);
    ranked
}

/// The best-ranked record as a candidate, or `None` when nothing has art.
pub fn single_winner(records: Vec<CardRecord>) -> Option<CandidateCard> {
    let winner = rank_records(records).into_iter().next()?;
    if let Some(uri) = winner.art_crop().map(str::to_string) {
        return Some(CandidateCard {
            name: winner.name,
            artist: winner.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            set_code: winner.set,
            image_uri: Some(uri),
        });
    }

    // Art came from the front face: name the file after that face.
    let face = winner.card_faces.as_ref().and_then(|f| f.first())?;
    Some(CandidateCard {
        name: face.name.clone(),
        artist: face
            .artist
            .as_deref()
            .or(winner.artist.as_deref())
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string(),
        set_code: winner.set.clone(),
        image_uri: face.art_crop().map(str::to_string),
    })
}

/// One candidate per face of every record, in input order.
///
/// A face without its own art crop falls back to the record's (split and
/// flip cards share one image); a face with neither keeps `image_uri: None`.
pub fn flatten_faces(records: &[CardRecord]) -> Vec<CandidateCard> {
    let mut candidates = Vec::new();
    for record in records {
        let record_artist = record.artist.as_deref();
        match record.card_faces.as_deref() {
            Some(faces) if !faces.is_empty() => {
                for face in faces {
                    candidates.push(CandidateCard {
                        name: face.name.clone(),
                        artist: face
                            .artist
                            .as_deref()
                            .or(record_artist)
                            .unwrap_or(UNKNOWN_ARTIST)
                            .to_string(),
                        set_code: record.set.clone(),
                        image_uri: face
                            .art_crop()
                            .or_else(|| record.art_crop())
                            .map(str::to_string),
                    });
                }
            }
            _ => candidates.push(CandidateCard {
                name: record.name.clone(),
                artist: record_artist.unwrap_or(UNKNOWN_ARTIST).to_string(),
                set_code: record.set.clone(),
                image_uri: record.art_crop().map(str::to_string),
            }),
        }
    }
    candidates
}

/// Apply the configured policy.
pub fn select_candidates(records: Vec<CardRecord>, policy: RankingPolicy) -> Vec<CandidateCard> {
    match policy {
        RankingPolicy::SingleWinner => single_winner(records).into_iter().collect(),
        RankingPolicy::AllFaces => flatten_faces(&records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{CardFace, ImageUris};
    use chrono::NaiveDate;

    fn uris(uri: &str) -> Option<ImageUris> {
        Some(ImageUris {
            art_crop: Some(uri.to_string()),
            ..Default::default()
        })
    }

    fn printing(set: &str, year: i32) -> CardRecord {
        CardRecord {
            name: "Lightning Bolt".into(),
            artist: Some("Christopher Rush".into()),
            set: set.into(),
            released_at: NaiveDate::from_ymd_opt(year, 1, 1),
            image_uris: uris(&format!("https://img/{set}.jpg")),
            ..Default::default()
        }
    }

    fn dfc() -> CardRecord {
        CardRecord {
            name: "Delver of Secrets // Insectile Aberration".into(),
            set: "isd".into(),
            card_faces: Some(vec![
                CardFace {
                    name: "Delver of Secrets".into(),
                    artist: Some("Matt Stewart".into()),
                    image_uris: uris("https://img/front.jpg"),
                },
                CardFace {
                    name: "Insectile Aberration".into(),
                    artist: None,
                    image_uris: uris("https://img/back.jpg"),
                },
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn non_promo_beats_newer_promo() {
        let a = CardRecord {
            promo: true,
            highres_image: true,
            ..printing("pa", 2020)
        };
        let b = CardRecord {
            highres_image: true,
            ..printing("b", 2015)
        };
        let ranked = rank_records(vec![a, b]);
        assert_eq!(ranked[0].set, "b");
        assert_eq!(ranked[1].set, "pa");
    }

    #[test]
    fn newest_wins_when_flags_tie() {
        let ranked = rank_records(vec![printing("old", 1993), printing("new", 2021)]);
        assert_eq!(ranked[0].set, "new");
    }

    #[test]
    fn flag_priority_order() {
        let textless = CardRecord {
            textless: true,
            ..printing("txt", 2000)
        };
        let full_art = CardRecord {
            full_art: true,
            highres_image: true,
            ..printing("fa", 2000)
        };
        let variation = CardRecord {
            variation: true,
            highres_image: true,
            ..printing("var", 2000)
        };
        let lowres = printing("low", 2000);
        let ranked = rank_records(vec![textless, full_art, variation, lowres]);
        let sets: Vec<&str> = ranked.iter().map(|r| r.set.as_str()).collect();
        assert_eq!(sets, ["low", "var", "fa", "txt"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_records(vec![printing("first", 2000), printing("second", 2000)]);
        assert_eq!(ranked[0].set, "first");
        assert_eq!(compare_preference(&ranked[0], &ranked[1]), Ordering::Equal);
    }

    #[test]
    fn art_less_records_are_dropped() {
        let no_art = CardRecord {
            image_uris: None,
            ..printing("none", 2024)
        };
        let ranked = rank_records(vec![no_art, printing("ok", 1999)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].set, "ok");
        assert!(single_winner(vec![CardRecord::default()]).is_none());
    }

    #[test]
    fn art_is_the_most_significant_key() {
        let no_art = CardRecord {
            image_uris: None,
            ..printing("none", 2024)
        };
        let worst_with_art = CardRecord {
            textless: true,
            promo: true,
            full_art: true,
            variation: true,
            ..printing("art", 1990)
        };
        assert_eq!(compare_preference(&worst_with_art, &no_art), Ordering::Less);
    }

    /// Every combination of the boolean keys plus two dates.
    fn all_combinations() -> Vec<CardRecord> {
        let mut out = Vec::new();
        for bits in 0u32..128 {
            let bit = |n: u32| bits & (1 << n) != 0;
            out.push(CardRecord {
                image_uris: if bit(0) { uris("https://img/x.jpg") } else { None },
                textless: bit(1),
                promo: bit(2),
                full_art: bit(3),
                variation: bit(4),
                highres_image: bit(5),
                released_at: NaiveDate::from_ymd_opt(if bit(6) { 2020 } else { 2010 }, 1, 1),
                ..Default::default()
            });
        }
        out
    }

    #[test]
    fn comparator_is_transitive() {
        let all = all_combinations();
        for x in &all {
            for y in &all {
                if compare_preference(x, y) != Ordering::Less {
                    continue;
                }
                for z in &all {
                    if compare_preference(y, z) == Ordering::Less {
                        assert_eq!(compare_preference(x, z), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn comparator_is_antisymmetric_and_deterministic() {
        let all = all_combinations();
        for x in &all {
            for y in &all {
                assert_eq!(compare_preference(x, y), compare_preference(y, x).reverse());
            }
        }
        let mut once = all.clone();
        once.sort_by(compare_preference);
        let mut twice = once.clone();
        twice.sort_by(compare_preference);
        assert_eq!(once, twice);
    }

    #[test]
    fn winner_carries_record_fields() {
        let winner = single_winner(vec![printing("lea", 1993)]).unwrap();
        assert_eq!(
            winner,
            CandidateCard {
                name: "Lightning Bolt".into(),
                artist: "Christopher Rush".into(),
                set_code: "lea".into(),
                image_uri: Some("https://img/lea.jpg".into()),
            }
        );
    }

    #[test]
    fn double_faced_winner_uses_front_face() {
        let winner = single_winner(vec![dfc()]).unwrap();
        assert_eq!(winner.name, "Delver of Secrets");
        assert_eq!(winner.artist, "Matt Stewart");
        assert_eq!(winner.image_uri.as_deref(), Some("https://img/front.jpg"));
    }

    #[test]
    fn all_faces_yields_one_candidate_per_face() {
        let candidates = flatten_faces(&[dfc()]);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Delver of Secrets");
        assert_eq!(candidates[1].name, "Insectile Aberration");
        assert_eq!(candidates[1].artist, UNKNOWN_ARTIST);
        assert_eq!(candidates[1].image_uri.as_deref(), Some("https://img/back.jpg"));
    }

    #[test]
    fn all_faces_keeps_art_less_and_duplicates() {
        let no_art = CardRecord {
            name: "Blank".into(),
            ..Default::default()
        };
        let records = vec![printing("a", 2000), printing("a", 2000), no_art];
        let candidates = select_candidates(records, RankingPolicy::AllFaces);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], candidates[1]);
        assert_eq!(candidates[2].image_uri, None);
        assert_eq!(candidates[2].artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn split_card_faces_fall_back_to_record_art() {
        let split = CardRecord {
            name: "Fire // Ice".into(),
            artist: Some("Franz Vohwinkel".into()),
            set: "apc".into(),
            image_uris: uris("https://img/fire-ice.jpg"),
            card_faces: Some(vec![
                CardFace {
                    name: "Fire".into(),
                    ..Default::default()
                },
                CardFace {
                    name: "Ice".into(),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let candidates = flatten_faces(&[split]);
        assert_eq!(candidates.len(), 2);
        assert!(candidates
            .iter()
            .all(|c| c.image_uri.as_deref() == Some("https://img/fire-ice.jpg")));
        assert_eq!(candidates[0].artist, "Franz Vohwinkel");
    }

    #[test]
    fn single_policy_returns_at_most_one() {
        let records = vec![printing("a", 2000), printing("b", 2010)];
        let candidates = select_candidates(records, RankingPolicy::SingleWinner);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].set_code, "b");
    }
}
