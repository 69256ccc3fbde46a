//! Fixed label ↔ identifier tables shared with the matching backend.
//!
//! Identifiers are assigned by the backend; a label added here must ship
//! together with the backend row it refers to.

/// A fixed mapping between option labels and backend identifiers.
#[derive(Debug)]
pub struct LookupTable {
    name: &'static str,
    entries: &'static [(&'static str, u32)],
}

impl LookupTable {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, u32)]) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identifier for `label`.
    ///
    /// Exact matches win; otherwise labels are compared with all whitespace
    /// removed, so `"오전(08~11시)"` finds `"오전(08~ 11시)"`.
    pub fn id_of(&self, label: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == label)
            .or_else(|| {
                let compacted = compact(label);
                self.entries
                    .iter()
                    .find(|(candidate, _)| compact_eq(candidate, &compacted))
            })
            .map(|(_, id)| *id)
    }

    /// First label registered for `id`.
    pub fn label_of(&self, id: u32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, candidate)| *candidate == id)
            .map(|(label, _)| *label)
    }

    /// Map labels to identifiers in order, dropping unmapped labels.
    ///
    /// Duplicates are kept.
    pub fn map_labels<'a, I>(&self, labels: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels
            .into_iter()
            .filter_map(|label| {
                let id = self.id_of(label).filter(|id| *id > 0);
                if id.is_none() {
                    tracing::debug!(table = self.name, label, "dropping unmapped label");
                }
                id
            })
            .collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(label, _)| *label)
    }
}

fn compact(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

fn compact_eq(candidate: &str, compacted: &str) -> bool {
    candidate
        .chars()
        .filter(|c| !c.is_whitespace())
        .eq(compacted.chars())
}

/// Subjects selectable in onboarding and post forms.
pub static SUBJECTS: LookupTable = LookupTable::new(
    "subject",
    &[
        ("웹 기초", 1),
        ("React", 8),
        ("안드로이드 앱", 2),
        ("iOS 앱", 3),
        ("React Native", 4),
        ("Python", 5),
        ("JAVA", 6),
        ("Spring", 6),
        ("C 언어", 7),
        ("데이터베이스", 9),
        ("아두이노/라즈베리파이", 10),
        ("블록코딩", 11),
    ],
);

/// Display names the backend uses for subject identifiers.
pub static SUBJECT_NAMES: LookupTable = LookupTable::new(
    "subject_name",
    &[
        ("웹 개발", 1),
        ("안드로이드 앱", 2),
        ("iOS 앱", 3),
        ("React Native", 4),
        ("Python", 5),
        ("JAVA / Spring", 6),
        ("C 언어", 7),
        ("HTML/CSS/JavaScript", 8),
        ("데이터베이스", 9),
        ("아두이노/라즈베리파이", 10),
        ("블록코딩", 11),
    ],
);

/// Lesson purposes, called goals by the backend.
pub static PURPOSES: LookupTable = LookupTable::new(
    "purpose",
    &[
        ("취미/자기개발", 1),
        ("취업준비", 2),
        ("공모전/프로젝트", 3),
        ("학업관련", 4),
        ("기타", 5),
    ],
);

pub static SKILL_LEVELS: LookupTable = LookupTable::new(
    "skill_level",
    &[
        ("관련 지식 없음", 1),
        ("기초 언어만 앎", 2),
        ("기본 활용 가능", 3),
        ("실무 활용 가능", 4),
        ("기타", 5),
    ],
);

pub static LESSON_TYPES: LookupTable = LookupTable::new(
    "lesson_type",
    &[
        ("개인 과외", 1),
        ("그룹 과외", 2),
        ("온라인 과외", 3),
        ("무관", 4),
    ],
);

pub static TIME_BANDS: LookupTable = LookupTable::new(
    "time_band",
    &[
        ("이른 오전(05~07시)", 1),
        ("오전(08~ 11시)", 2),
        ("오후(12~14시)", 3),
        ("늦은 오후(15~17시)", 4),
        ("저녁(18~20시)", 5),
        ("밤(21~23시)", 6),
    ],
);

/// Top-level administrative regions (시/도).
pub static REGIONS: LookupTable = LookupTable::new(
    "region",
    &[
        ("서울특별시", 1),
        ("부산광역시", 2),
        ("대구광역시", 3),
        ("인천광역시", 4),
        ("광주광역시", 5),
        ("대전광역시", 6),
        ("울산광역시", 7),
        ("세종특별자치시", 8),
        ("경기도", 9),
        ("강원특별자치도", 10),
        ("충청북도", 11),
        ("충청남도", 12),
        ("전라북도", 13),
        ("전라남도", 14),
        ("경상북도", 15),
        ("경상남도", 16),
        ("제주특별자치도", 17),
    ],
);

/// Weekday labels in backend order: 월 is 0, 일 is 6.
pub const WEEKDAYS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// Zero-based weekday index for a day label.
pub fn weekday_index(label: &str) -> Option<u8> {
    let label = label.trim();
    WEEKDAYS
        .iter()
        .position(|day| *day == label)
        .map(|index| index as u8)
}

/// Time band for a slot label; unmapped slots fall back to `0`.
pub fn time_band_id(label: &str) -> u32 {
    TIME_BANDS.id_of(label).unwrap_or(0)
}

/// Region identifier for either a 시/도 label or a full
/// `"<시/도> <시/군/구>"` selection, resolved through its 시/도 part.
pub fn region_id(selection: &str) -> Option<u32> {
    let selection = selection.trim();
    REGIONS.id_of(selection).or_else(|| {
        selection
            .split_whitespace()
            .next()
            .and_then(|sido| REGIONS.id_of(sido))
    })
}

/// Map region selections to identifiers, dropping unknown ones.
pub fn region_ids<'a, I>(selections: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    selections
        .into_iter()
        .filter_map(|selection| {
            let id = region_id(selection);
            if id.is_none() {
                tracing::debug!(table = REGIONS.name(), selection, "dropping unmapped region");
            }
            id
        })
        .collect()
}
