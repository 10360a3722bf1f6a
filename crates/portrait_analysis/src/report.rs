//! Plain-text report rendering.

use portrait_core::{Analysis, StressLabel, Trait, TraitVector};
use std::fmt::Write;

const BAR_CELLS: usize = 20;

/// 20-cell bar, one filled cell per 5 points, followed by the value.
pub fn bar(value: u8) -> String {
    let filled = (value.min(100) / 5) as usize;
    format!(
        "{}{} ({})",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled),
        value
    )
}

/// Reliability of the profile in percent, from what the backend could tell us.
pub fn confidence_score(age: u32, gender: &str, dominant_emotion: &str) -> u8 {
    let mut score: i32 = 90;
    if age == 0 {
        score -= 15;
    }
    if gender.trim().is_empty() {
        score -= 10;
    }
    if dominant_emotion.eq_ignore_ascii_case("neutral") {
        score -= 10;
    }
    score.clamp(40, 97) as u8
}

pub fn archetype(traits: &TraitVector) -> &'static str {
    let (e, a, n) = (traits.extraversion, traits.agreeableness, traits.neuroticism);
    if e > 60 && a > 55 {
        "Комунікатор / Ведучий (ENFJ-style)"
    } else if e < 45 && n < 50 {
        "Аналітик / Стратег (INTJ-style)"
    } else if a > 65 && n > 55 {
        "Емпат / Підтримуючий тип (INFP-style)"
    } else {
        "Універсальний адаптивний тип"
    }
}

pub fn stress_forecast(label: StressLabel) -> &'static str {
    match label {
        StressLabel::Low => {
            "У стресі зберігає контроль, рішення приймає раціонально. \
             Малоймовірні різкі емоційні реакції."
        }
        StressLabel::Medium => {
            "Стрес переноситься помірно. Можлива підвищена напруга, \
             але самоконтроль зазвичай зберігається."
        }
        StressLabel::High => {
            "Висока реактивність. Можливі різкі зміни настрою, \
             звуження уваги та імпульсивність."
        }
    }
}

/// One-paragraph summary opening the report.
pub fn microportrait(analysis: &Analysis) -> String {
    let info = analysis.personality.temperament.info();
    let mut text = format!(
        "Людина з домінуючим радикалом «{}». Поведінка поєднує риси: {}. Емоційний фон: {}.",
        info.name,
        info.short.to_lowercase(),
        analysis.emotion.dominant
    );
    if let Some(geometry) = &analysis.personality.geometry {
        if let Some(first) = geometry.interpret().first() {
            let _ = write!(text, " Фізіогномічні ознаки вказують на {}.", first);
        }
    }
    text
}

const RULE: &str = "----------------------------------";

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}\n{}", RULE, title, RULE);
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "• {}", item);
    }
}

/// Full sectioned report for one analysis.
pub fn render_report(analysis: &Analysis) -> String {
    let personality = &analysis.personality;
    let info = personality.temperament.info();
    let mut out = String::new();

    out.push_str("=============================\n");
    out.push_str("   🧠 ПСИХОЛОГІЧНИЙ ПРОФІЛЬ\n");
    out.push_str("=============================\n\n");

    out.push_str("📌 Загальна характеристика\n");
    out.push_str(&microportrait(analysis));
    out.push('\n');

    section(&mut out, "I. 😶 Емоційний стан");
    let _ = writeln!(out, "{}", analysis.emotion.describe());
    let _ = writeln!(
        out,
        "Валентність: {:.1} / 100, інтенсивність: {:.1} / 100, стабільність: {}.",
        analysis.emotion.valence,
        analysis.emotion.intensity,
        analysis.emotion.stability.label()
    );

    section(&mut out, "II. 🧩 Особистісний профіль (Big Five)");
    for (t, score) in personality.big_five.iter() {
        let _ = writeln!(out, "{:<16} {}", format!("{}:", t.name()), bar(score));
    }

    section(&mut out, &format!("III. 🎭 Провідний радикал: {}", info.name));
    let _ = writeln!(out, "📌 Коротко:\n{}\n", info.short);
    let _ = writeln!(out, "📌 Детальний опис:\n{}", info.description);
    if !personality.explanation.is_empty() {
        out.push_str("\n📌 Чому саме цей радикал:\n");
        bullets(&mut out, &personality.explanation);
    }

    section(&mut out, "IV. 🧬 Архетип поведінки");
    let _ = writeln!(out, "{}", archetype(&personality.big_five));

    section(&mut out, "V. 👁 Фізіогномічний профіль");
    match &personality.geometry {
        Some(g) => {
            let _ = writeln!(
                out,
                "fWHR {:.2}, симетрія {:.2}, щелепа {:.2}, брови {:.2}, очі {:.2}",
                g.fwhr, g.symmetry, g.jaw, g.brow, g.eyes
            );
            for reading in g.interpret() {
                let _ = writeln!(out, "- {}", reading);
            }
        }
        None => out.push_str("Геометрію обличчя виміряти не вдалося.\n"),
    }

    section(&mut out, "VI. 🔧 Робоча поведінка");
    bullets(&mut out, &analysis.recommendations.work_style);

    section(&mut out, "VII. 🤝 Комунікація");
    bullets(&mut out, &analysis.recommendations.communication);

    section(&mut out, "VIII. ⚠️ Поведінкові ризики");
    bullets(&mut out, &analysis.recommendations.risks);

    section(&mut out, "IX. 🚀 Професійні ролі");
    bullets(&mut out, &analysis.recommendations.roles);

    section(&mut out, "X. 🔥 Мікрострес і прогноз поведінки в стресі");
    let _ = writeln!(
        out,
        "Рівень напруги: {} ({:.0} / 100)",
        analysis.stress.label.label(),
        analysis.stress.level
    );
    bullets(&mut out, &analysis.stress.factors);
    let _ = writeln!(out, "{}", stress_forecast(analysis.stress.label));

    section(&mut out, "XI. 🧪 Рівень достовірності аналізу");
    let _ = writeln!(out, "{}%", analysis.confidence);
    if !personality.notes.is_empty() {
        bullets(&mut out, &personality.notes);
    }

    out.push_str("\n=============================\n");
    out.push_str("📘 Кінець звіту\n");
    out.push_str("=============================");
    out
}

/// Short Big Five block, used by history summaries.
pub fn render_big_five(traits: &TraitVector) -> String {
    Trait::ALL
        .iter()
        .zip(traits.as_array())
        .map(|(t, score)| format!("{}: {}", t.local_name(), score))
        .collect::<Vec<_>>()
        .join("\n")
}
