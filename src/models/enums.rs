use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form doubles as the serde representation.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Organ {
    Liver => "liver",
    Spleen => "spleen",
    Kidneys => "kidneys",
    Bladder => "bladder",
    Prostate => "prostate",
});

impl Organ {
    /// Fixed organ order used by inference output and rendering.
    pub const ALL: [Organ; 5] = [
        Organ::Liver,
        Organ::Spleen,
        Organ::Kidneys,
        Organ::Bladder,
        Organ::Prostate,
    ];

    /// Polish label used in rendered reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Organ::Liver => "Wątroba",
            Organ::Spleen => "Śledziona",
            Organ::Kidneys => "Nerki",
            Organ::Bladder => "Pęcherz moczowy",
            Organ::Prostate => "Prostata",
        }
    }
}

str_enum!(Section {
    Reason => "reason",
    Findings => "findings",
    Conclusions => "conclusions",
    Recommendations => "recommendations",
});

str_enum!(OrganStatus {
    Normal => "normal",
    Abnormal => "abnormal",
});

str_enum!(CaseStatus {
    Normal => "normal",
    Abnormal => "abnormal",
});

str_enum!(ExtractionStrategy {
    Heuristic => "heuristic",
    Inference => "inference",
});

str_enum!(ReportVariant {
    AbnormalCase => "abnormal_case",
    NormalCase => "normal_case",
    TemplateOnly => "template_only",
});

str_enum!(PathKind {
    Primary => "primary",
    Secondary => "secondary",
});
