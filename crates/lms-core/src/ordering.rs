//! Lesson ordering within chapters.
//!
//! A chapter's lessons are kept as an ordered list; the persisted form is a
//! set of [`LessonReference`] rows whose `idx` values are exactly `1..=N` in
//! display order. Every mutation here works on the in-memory list and the
//! store rewrites all `idx` values of a touched chapter from
//! [`ChapterOrdering::references`], so gaps or duplicates left by earlier
//! writes are healed on the next reorder.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChapterId, LessonId, LessonReference};

/// Errors raised while planning a lesson move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// The lesson has no reference row in the chapter it is moved out of.
    #[error("lesson {lesson} is not in chapter {chapter}")]
    LessonNotInChapter { lesson: LessonId, chapter: ChapterId },

    /// The lesson is already referenced by the chapter it is moved into.
    #[error("lesson {lesson} is already in chapter {chapter}")]
    DuplicateLessonReference { lesson: LessonId, chapter: ChapterId },

    /// An ordering for one chapter was supplied where another was expected.
    #[error("expected ordering of chapter {expected}, got {actual}")]
    ChapterMismatch {
        expected: ChapterId,
        actual: ChapterId,
    },
}

/// The lessons of one chapter in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOrdering {
    chapter: ChapterId,
    lessons: Vec<LessonId>,
}

impl ChapterOrdering {
    /// Build an ordering from lessons already sorted by `idx`.
    ///
    /// Fails if a lesson appears twice.
    pub fn new(chapter: ChapterId, lessons: Vec<LessonId>) -> Result<Self, OrderingError> {
        let mut seen = HashSet::with_capacity(lessons.len());
        for lesson in &lessons {
            if !seen.insert(*lesson) {
                return Err(OrderingError::DuplicateLessonReference {
                    lesson: *lesson,
                    chapter,
                });
            }
        }
        Ok(Self { chapter, lessons })
    }

    #[must_use]
    pub fn empty(chapter: ChapterId) -> Self {
        Self {
            chapter,
            lessons: Vec::new(),
        }
    }

    #[must_use]
    pub fn chapter(&self) -> ChapterId {
        self.chapter
    }

    #[must_use]
    pub fn lessons(&self) -> &[LessonId] {
        &self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// 0-based display position of `lesson`.
    #[must_use]
    pub fn position(&self, lesson: LessonId) -> Option<usize> {
        self.lessons.iter().position(|l| *l == lesson)
    }

    #[must_use]
    pub fn contains(&self, lesson: LessonId) -> bool {
        self.position(lesson).is_some()
    }

    /// Remove `lesson`, closing the gap. Returns its former position.
    pub fn remove(&mut self, lesson: LessonId) -> Result<usize, OrderingError> {
        let pos = self
            .position(lesson)
            .ok_or(OrderingError::LessonNotInChapter {
                lesson,
                chapter: self.chapter,
            })?;
        self.lessons.remove(pos);
        Ok(pos)
    }

    /// Insert `lesson` before the lesson currently at `index`.
    ///
    /// Indices past the end append. Returns the position actually used.
    pub fn insert(&mut self, lesson: LessonId, index: usize) -> Result<usize, OrderingError> {
        if self.contains(lesson) {
            return Err(OrderingError::DuplicateLessonReference {
                lesson,
                chapter: self.chapter,
            });
        }
        let at = index.min(self.lessons.len());
        self.lessons.insert(at, lesson);
        Ok(at)
    }

    /// Append `lesson` at the end.
    pub fn push(&mut self, lesson: LessonId) -> Result<usize, OrderingError> {
        self.insert(lesson, self.lessons.len())
    }

    /// Move `lesson` to `index` of the list obtained after removing it.
    pub fn move_to(&mut self, lesson: LessonId, index: usize) -> Result<usize, OrderingError> {
        self.remove(lesson)?;
        self.insert(lesson, index)
    }

    /// The dense 1-based reference rows for this ordering.
    #[must_use]
    pub fn references(&self) -> Vec<LessonReference> {
        self.lessons
            .iter()
            .enumerate()
            .map(|(i, lesson)| LessonReference {
                lesson: *lesson,
                chapter: self.chapter,
                idx: i as i32 + 1,
            })
            .collect()
    }
}

/// A request to move a lesson to a new position, possibly in another chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonMove {
    pub lesson: LessonId,
    pub source: ChapterId,
    pub target: ChapterId,
    /// 0-based insertion position in the target chapter's list.
    pub index: usize,
}

/// The chapter orderings to persist after a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPlan {
    WithinChapter(ChapterOrdering),
    AcrossChapters {
        source: ChapterOrdering,
        target: ChapterOrdering,
    },
}

impl ReorderPlan {
    /// Every ordering the plan touches.
    #[must_use]
    pub fn orderings(&self) -> Vec<&ChapterOrdering> {
        match self {
            Self::WithinChapter(ordering) => vec![ordering],
            Self::AcrossChapters { source, target } => vec![source, target],
        }
    }
}

impl LessonMove {
    #[must_use]
    pub fn is_within_chapter(&self) -> bool {
        self.source == self.target
    }

    /// Plan a move inside a single chapter.
    pub fn plan_within(&self, mut ordering: ChapterOrdering) -> Result<ReorderPlan, OrderingError> {
        expect_chapter(self.source, &ordering)?;
        ordering.move_to(self.lesson, self.index)?;
        Ok(ReorderPlan::WithinChapter(ordering))
    }

    /// Plan a move from the source chapter into a different target chapter.
    pub fn plan_across(
        &self,
        mut source: ChapterOrdering,
        mut target: ChapterOrdering,
    ) -> Result<ReorderPlan, OrderingError> {
        expect_chapter(self.source, &source)?;
        expect_chapter(self.target, &target)?;
        source.remove(self.lesson)?;
        target.insert(self.lesson, self.index)?;
        Ok(ReorderPlan::AcrossChapters { source, target })
    }
}

fn expect_chapter(expected: ChapterId, ordering: &ChapterOrdering) -> Result<(), OrderingError> {
    if ordering.chapter == expected {
        Ok(())
    } else {
        Err(OrderingError::ChapterMismatch {
            expected,
            actual: ordering.chapter,
        })
    }
}
