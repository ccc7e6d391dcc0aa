//! # Conversion des positions de lecture
//!
//! Le catalogue distant mémorise une position absolue (secondes depuis le
//! début du livre) alors que le lecteur reprend la lecture sur une partie
//! précise avec un décalage relatif à cette partie.
//!
//! - [`PositionResolver`] : position absolue → (partie, décalage)
//! - [`ProgressAccumulator`] : (partie, décalage) → position absolue
//!
//! Pour toute position `p` dans `[0, durée totale)` :
//! `accumulate(parts, resolve(parts, p)) == p` (aux arrondis près).

use crate::error::{BookError, Result};
use crate::model::{Part, PartPosition, Seconds};

/// Résultat d'une résolution de position
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// La position tombe dans la partie `index`
    Within { index: usize, position: PartPosition },

    /// La position dépasse la fin du livre: ramenée à la fin de la dernière
    /// partie jouable
    PastEnd {
        index: usize,
        position: PartPosition,
        requested: Seconds,
        total: Seconds,
    },
}

impl Resolution {
    /// Index de la partie résolue dans la séquence d'origine
    pub fn index(&self) -> usize {
        match self {
            Self::Within { index, .. } | Self::PastEnd { index, .. } => *index,
        }
    }

    pub fn position(&self) -> &PartPosition {
        match self {
            Self::Within { position, .. } | Self::PastEnd { position, .. } => position,
        }
    }

    pub fn is_past_end(&self) -> bool {
        matches!(self, Self::PastEnd { .. })
    }

    /// Refuse le ramenage en fin de livre: `PastEnd` devient `OutOfRange`
    pub fn strict(self) -> Result<(usize, PartPosition)> {
        match self {
            Self::Within { index, position } => Ok((index, position)),
            Self::PastEnd {
                requested, total, ..
            } => Err(BookError::OutOfRange { requested, total }),
        }
    }
}

/// Convertit une position absolue en position relative à une partie
pub struct PositionResolver;

impl PositionResolver {
    /// Trouve la partie contenant `position` et le décalage dans cette partie
    ///
    /// La partie retenue est la première dont la borne cumulée de fin est
    /// strictement supérieure à `position` : une position exactement sur une
    /// frontière appartient à la partie suivante. Les parties de durée nulle
    /// ne sont jamais retenues.
    ///
    /// # Errors
    ///
    /// - [`BookError::InvalidPosition`] si `position` est négative ou non finie
    /// - [`BookError::NotFound`] si aucune partie n'a de durée positive
    ///
    /// # Examples
    ///
    /// ```
    /// use pmoaudiobook::{Part, PositionResolver};
    ///
    /// let parts = vec![Part::new("a", 100.0), Part::new("b", 200.0)];
    /// let resolved = PositionResolver::resolve(&parts, 150.0).unwrap();
    /// assert_eq!(resolved.position().part_id, "b");
    /// assert_eq!(resolved.position().offset, 50.0);
    /// ```
    pub fn resolve(parts: &[Part], position: Seconds) -> Result<Resolution> {
        if !position.is_finite() || position < 0.0 {
            return Err(BookError::InvalidPosition(position));
        }

        let mut start = 0.0;
        let mut last_playable: Option<(usize, &Part)> = None;

        for (index, part) in parts.iter().enumerate() {
            if !part.is_playable() {
                continue;
            }

            let end = start + part.duration;
            if end > position {
                tracing::trace!(index, part_id = %part.id, start, end, position, "Position resolved");
                return Ok(Resolution::Within {
                    index,
                    position: PartPosition::new(&part.id, position - start),
                });
            }

            last_playable = Some((index, part));
            start = end;
        }

        match last_playable {
            Some((index, part)) => {
                tracing::debug!(
                    position,
                    total = start,
                    part_id = %part.id,
                    "Position past the end of the book, clamped to the last part"
                );
                Ok(Resolution::PastEnd {
                    index,
                    position: PartPosition::new(&part.id, part.duration),
                    requested: position,
                    total: start,
                })
            }
            None => Err(BookError::not_found("no playable part")),
        }
    }
}

/// Convertit une position relative à une partie en position absolue
pub struct ProgressAccumulator;

impl ProgressAccumulator {
    /// Somme des durées des parties qui précèdent `target.part_id`, plus le décalage
    ///
    /// # Errors
    ///
    /// - [`BookError::NotFound`] si `target.part_id` ne désigne aucune partie
    /// - [`BookError::InvalidPosition`] si le décalage est négatif ou non fini
    pub fn accumulate(parts: &[Part], target: &PartPosition) -> Result<Seconds> {
        if !target.offset.is_finite() || target.offset < 0.0 {
            return Err(BookError::InvalidPosition(target.offset));
        }

        let mut elapsed = 0.0;
        for part in parts {
            if part.id == target.part_id {
                return Ok(elapsed + target.offset);
            }
            elapsed += part.playable_duration();
        }

        Err(BookError::not_found(format!("part {}", target.part_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(durations: &[(&str, f64)]) -> Vec<Part> {
        durations.iter().map(|(id, d)| Part::new(*id, *d)).collect()
    }

    #[test]
    fn test_resolve_first_part() {
        let parts = parts(&[("a", 100.0), ("b", 200.0)]);
        let r = PositionResolver::resolve(&parts, 42.5).unwrap();
        assert_eq!(r, Resolution::Within {
            index: 0,
            position: PartPosition::new("a", 42.5),
        });
    }

    #[test]
    fn test_resolve_second_part() {
        let parts = parts(&[("a", 100.0), ("b", 200.0)]);
        let r = PositionResolver::resolve(&parts, 150.0).unwrap();
        assert_eq!(r.index(), 1);
        assert_eq!(r.position(), &PartPosition::new("b", 50.0));
        assert!(!r.is_past_end());
    }

    #[test]
    fn test_boundary_belongs_to_next_part() {
        let parts = parts(&[("a", 100.0), ("b", 200.0)]);
        let r = PositionResolver::resolve(&parts, 100.0).unwrap();
        assert_eq!(r.position(), &PartPosition::new("b", 0.0));
    }

    #[test]
    fn test_zero_duration_part_is_skipped() {
        // Bornes cumulées: [10, 25, 25, 40]
        let parts = parts(&[("p0", 10.0), ("p1", 15.0), ("p2", 0.0), ("p3", 15.0)]);
        let r = PositionResolver::resolve(&parts, 25.0).unwrap();
        assert_eq!(r.index(), 3);
        assert_eq!(r.position(), &PartPosition::new("p3", 0.0));
    }

    #[test]
    fn test_leading_zero_duration_part_at_start() {
        let parts = parts(&[("intro", 0.0), ("a", 10.0)]);
        let r = PositionResolver::resolve(&parts, 0.0).unwrap();
        assert_eq!(r.index(), 1);
        assert_eq!(r.position().offset, 0.0);
    }

    #[test]
    fn test_past_end_is_clamped() {
        let parts = parts(&[("a", 100.0), ("b", 200.0)]);
        let r = PositionResolver::resolve(&parts, 305.0).unwrap();
        assert!(r.is_past_end());
        assert_eq!(r.index(), 1);
        assert_eq!(r.position(), &PartPosition::new("b", 200.0));
        assert_eq!(
            r.strict(),
            Err(BookError::OutOfRange {
                requested: 305.0,
                total: 300.0
            })
        );
    }

    #[test]
    fn test_exact_end_is_past_end() {
        let parts = parts(&[("a", 100.0)]);
        let r = PositionResolver::resolve(&parts, 100.0).unwrap();
        assert!(r.is_past_end());
        assert_eq!(r.position().offset, 100.0);
    }

    #[test]
    fn test_past_end_skips_trailing_zero_duration_part() {
        let parts = parts(&[("a", 100.0), ("credits", 0.0)]);
        let r = PositionResolver::resolve(&parts, 120.0).unwrap();
        assert_eq!(r.position().part_id, "a");
        assert_eq!(r.index(), 0);
    }

    #[test]
    fn test_no_playable_part() {
        assert!(PositionResolver::resolve(&[], 0.0).unwrap_err().is_not_found());
        let zeros = parts(&[("a", 0.0), ("b", 0.0)]);
        assert!(PositionResolver::resolve(&zeros, 0.0).unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_position() {
        let parts = parts(&[("a", 100.0)]);
        assert_eq!(
            PositionResolver::resolve(&parts, -1.0),
            Err(BookError::InvalidPosition(-1.0))
        );
        assert!(PositionResolver::resolve(&parts, f64::NAN).is_err());
        assert!(PositionResolver::resolve(&parts, f64::INFINITY).is_err());
    }

    #[test]
    fn test_accumulate() {
        let parts = parts(&[("a", 100.0), ("b", 200.0)]);
        let abs = ProgressAccumulator::accumulate(&parts, &PartPosition::new("b", 50.0)).unwrap();
        assert_eq!(abs, 150.0);

        let abs = ProgressAccumulator::accumulate(&parts, &PartPosition::new("a", 12.0)).unwrap();
        assert_eq!(abs, 12.0);
    }

    #[test]
    fn test_accumulate_unknown_part() {
        let parts = parts(&[("a", 100.0)]);
        let err = ProgressAccumulator::accumulate(&parts, &PartPosition::new("zz", 1.0)).unwrap_err();
        assert_eq!(err, BookError::NotFound("part zz".to_string()));
    }

    #[test]
    fn test_accumulate_negative_offset() {
        let parts = parts(&[("a", 100.0)]);
        assert!(ProgressAccumulator::accumulate(&parts, &PartPosition::new("a", -3.0)).is_err());
    }
}
