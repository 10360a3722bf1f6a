//! Views over a user's report history: two-photo comparison and the HR summary.

use portrait_core::StoredReport;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Change between the two most recent analyses of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub latest_emotion: String,
    pub previous_emotion: String,
    pub latest_valence: f64,
    pub previous_valence: f64,
    pub latest_stress: f64,
    pub previous_stress: f64,
}

impl Comparison {
    pub fn between(latest: &StoredReport, previous: &StoredReport) -> Self {
        Self {
            latest_emotion: latest.analysis.emotion.dominant.clone(),
            previous_emotion: previous.analysis.emotion.dominant.clone(),
            latest_valence: latest.analysis.emotion.valence,
            previous_valence: previous.analysis.emotion.valence,
            latest_stress: latest.analysis.stress.level,
            previous_stress: previous.analysis.stress.level,
        }
    }

    pub fn valence_delta(&self) -> f64 {
        self.latest_valence - self.previous_valence
    }

    pub fn stress_delta(&self) -> f64 {
        self.latest_stress - self.previous_stress
    }

    /// Strictly greater only; an unchanged valence reads as "less positive".
    pub fn became_more_positive(&self) -> bool {
        self.latest_valence > self.previous_valence
    }

    pub fn stress_rose(&self) -> bool {
        self.latest_stress > self.previous_stress
    }

    pub fn emotion_changed(&self) -> bool {
        self.latest_emotion != self.previous_emotion
    }

    pub fn render(&self) -> String {
        let mut out = String::from("📊 Порівняння двох останніх аналізів\n\n");

        let _ = writeln!(out, "1️⃣ Останнє фото");
        let _ = writeln!(out, "- Емоція: {}", self.latest_emotion);
        let _ = writeln!(out, "- Валентність: {:.1}", self.latest_valence);
        let _ = writeln!(out, "- Стрес: {:.0}\n", self.latest_stress);

        let _ = writeln!(out, "2️⃣ Попереднє фото");
        let _ = writeln!(out, "- Емоція: {}", self.previous_emotion);
        let _ = writeln!(out, "- Валентність: {:.1}", self.previous_valence);
        let _ = writeln!(out, "- Стрес: {:.0}\n", self.previous_stress);

        out.push_str("🔄 Динаміка змін:\n\n");
        let _ = writeln!(
            out,
            "🧠 Емоційність: {} ({:+.1})",
            if self.became_more_positive() {
                "стан став більш позитивним"
            } else {
                "стан став менш позитивним"
            },
            self.valence_delta()
        );
        let _ = writeln!(
            out,
            "💥 Стрес: {} ({:+.0})",
            if self.stress_rose() {
                "рівень стресу зріс"
            } else {
                "стрес знизився або стабілізувався"
            },
            self.stress_delta()
        );
        if self.emotion_changed() {
            let _ = write!(
                out,
                "🙂 Домінантна емоція змінилась: {} → {}",
                self.previous_emotion, self.latest_emotion
            );
        } else {
            let _ = write!(out, "🙂 Домінантна емоція не змінилась: {}", self.latest_emotion);
        }
        out
    }
}

/// HR summary built from a user's most recent report.
pub fn render_summary(user_id: i64, report: &StoredReport) -> String {
    let personality = &report.analysis.personality;
    let recommendations = &report.analysis.recommendations;
    let first = |items: &[String]| items.first().cloned().unwrap_or_else(|| "—".to_string());

    let mut out = format!("👤 HR Summary для користувача {}\n\n", user_id);
    let _ = writeln!(out, "Психотип (радикал):\n- {}\n", personality.temperament);
    out.push_str("Ключові риси Big Five:\n");
    for (t, score) in personality.big_five.iter() {
        let _ = writeln!(out, "- {}: {}", t.local_name(), score);
    }
    let _ = writeln!(out, "\nРекомендовані ролі:\n- {}\n", first(&recommendations.roles));
    let _ = writeln!(out, "Основні ризики:\n- {}\n", first(&recommendations.risks));
    let _ = write!(
        out,
        "Рекомендований стиль взаємодії:\n- {}\n\nАналіз від {}",
        first(&recommendations.communication),
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    out
}
