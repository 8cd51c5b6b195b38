use serde::{Deserialize, Serialize};

/// What the caller tells us about the candidate. Free text, passed through the run untouched.
/// Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub experience: String,
    pub skills: String,
    pub goals: String,
}

impl CandidateProfile {
    pub fn is_blank(&self) -> bool {
        [&self.experience, &self.skills, &self.goals]
            .iter()
            .all(|f| f.trim().is_empty())
    }

    /// Markdown block used when presenting the profile to the LLM scorer.
    pub fn prompt_text(&self) -> String {
        format!(
            "Candidate Profile:\n- **Experience**: {}\n- **Skills**: {}\n- **Goals**: {}",
            self.experience.trim(),
            self.skills.trim(),
            self.goals.trim()
        )
    }

    /// Skill phrases split on commas, semicolons, slashes and newlines, lowercased.
    pub fn skill_phrases(&self) -> Vec<String> {
        let mut phrases: Vec<String> = self
            .skills
            .split([',', ';', '/', '\n', '|'])
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        phrases.dedup();
        phrases
    }

    /// Largest "N years" figure mentioned in the experience text.
    pub fn stated_years(&self) -> Option<u32> {
        let text = self.experience.to_lowercase();
        let words: Vec<&str> = text
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '+'))
            .filter(|w| !w.is_empty())
            .collect();

        words
            .windows(2)
            .filter(|pair| pair[1].starts_with("year") || pair[1] == "yrs" || pair[1] == "yr")
            .filter_map(|pair| pair[0].trim_end_matches('+').parse::<u32>().ok())
            .max()
    }
}
