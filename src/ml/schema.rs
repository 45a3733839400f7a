//! Static feature declarations shared by validation, encoding and training.
//!
//! The order of `numeric ++ categorical ++ binary` is the column contract of a
//! trained artifact. Reordering any of these lists invalidates artifacts
//! written by an earlier build.

/// A real-valued feature with its accepted closed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericFeature {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

/// A string feature restricted to a fixed vocabulary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoricalFeature {
    pub name: &'static str,
    pub vocabulary: &'static [&'static str],
}

impl CategoricalFeature {
    /// Exact, case-sensitive vocabulary membership
    pub fn allows(&self, value: &str) -> bool {
        self.vocabulary.contains(&value)
    }
}

/// Feature schema
#[derive(Debug, Clone, Copy)]
pub struct FeatureSchema {
    pub numeric: &'static [NumericFeature],
    pub categorical: &'static [CategoricalFeature],
    pub binary: &'static [&'static str],
}

impl FeatureSchema {
    /// Feature names in serialization order
    pub fn feature_order(&self) -> Vec<&'static str> {
        self.numeric
            .iter()
            .map(|f| f.name)
            .chain(self.categorical.iter().map(|f| f.name))
            .chain(self.binary.iter().copied())
            .collect()
    }

    /// Fields every prediction request must carry
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.feature_order()
    }

    /// Number of declared features (before one-hot expansion)
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.binary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn categorical_feature(&self, name: &str) -> Option<&CategoricalFeature> {
        self.categorical.iter().find(|f| f.name == name)
    }
}

/// Schema of the salary model
pub static SALARY_SCHEMA: FeatureSchema = FeatureSchema {
    numeric: &[NumericFeature {
        name: "years_experience",
        min: 0.0,
        max: 50.0,
    }],
    categorical: &[
        CategoricalFeature {
            name: "education_level",
            vocabulary: &["High School", "Bachelor", "Master", "PhD"],
        },
        CategoricalFeature {
            name: "job_title",
            vocabulary: &[
                "Backend Engineer",
                "Data Analyst",
                "Data Scientist",
                "ML Engineer",
                "Full Stack Engineer",
                "Software Developer",
                "Other",
            ],
        },
        CategoricalFeature {
            name: "city",
            vocabulary: &["Bengaluru", "Hyderabad", "Pune", "Mumbai", "Chennai", "Delhi NCR"],
        },
        CategoricalFeature {
            name: "company_size",
            vocabulary: &["Small", "Medium", "Large"],
        },
    ],
    binary: &["skills_python", "skills_java", "skills_aws", "skills_sql"],
};

/// Target column of the training dataset
pub const TARGET_COLUMN: &str = "salary_in_inr";
