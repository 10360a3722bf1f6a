//! Work recommendations from the trait vector and temperament category.
//!
//! Trait rules use an inclusive threshold of 60 for "high" and an exclusive
//! threshold of 40 for "low", checked in O, C, E, A, N order. Each list has a
//! fallback entry, so none is ever empty.

use portrait_core::{RecommendationSet, TemperamentCategory, TraitVector};

const HIGH: u8 = 60;
const LOW: u8 = 40;

fn roles(t: &TraitVector) -> Vec<String> {
    let mut roles = Vec::new();
    if t.openness >= HIGH {
        roles.push("Креативні ролі (маркетинг, дизайн, генерація ідей).");
    }
    if t.conscientiousness >= HIGH {
        roles.push("Структурні ролі (менеджмент процесів, аналітика, контроль якості).");
    }
    if t.extraversion >= HIGH {
        roles.push("Роль публічного представника, продажі, переговори.");
    }
    if t.agreeableness >= HIGH {
        roles.push("Командні ролі, медіація, HR, підтримка людей.");
    }
    if t.neuroticism >= HIGH {
        roles.push(
            "Ролі з високою чутливістю до ризиків (перевірка, аудит, безпека), але з контролем \
            навантаження.",
        );
    }
    if roles.is_empty() {
        roles.push("Універсальні робочі ролі зі збалансованим навантаженням.");
    }
    roles.into_iter().map(String::from).collect()
}

fn work_style(t: &TraitVector) -> Vec<String> {
    let structure = if t.conscientiousness >= HIGH {
        "Любить порядок, системність та чіткі правила."
    } else {
        "Може віддавати перевагу більш вільному, гнучкому стилю роботи."
    };
    let social = if t.extraversion >= HIGH {
        "Комфортно почувається в середовищі з великою кількістю спілкування."
    } else {
        "Потребує часу на самостійні задачі та усамітнення."
    };
    vec![structure.to_string(), social.to_string()]
}

fn risks(t: &TraitVector) -> Vec<String> {
    let mut risks = Vec::new();
    if t.conscientiousness < LOW {
        risks.push("Ризик прокрастинації й труднощів із доведенням задач до кінця.");
    }
    if t.agreeableness < LOW {
        risks.push(
            "Можливі конфлікти через прямолінійність або жорсткість у відстоюванні позиції.",
        );
    }
    if t.neuroticism >= HIGH {
        risks.push("Схильність до перенапруги та емоційного вигорання при високому стресі.");
    }
    if risks.is_empty() {
        risks.push(
            "Серйозних поведінкових ризиків не видно, важливе лише дотримання балансу \
            навантаження.",
        );
    }
    risks.into_iter().map(String::from).collect()
}

fn communication(category: TemperamentCategory) -> Vec<String> {
    let note = match category {
        TemperamentCategory::Excitable => {
            "Краще говорити прямо, по суті, без затягувань, але з повагою."
        }
        TemperamentCategory::Hysteroid => {
            "Підходить енергійний, живий стиль спілкування, з акцентом на можливості."
        }
        TemperamentCategory::Sensitive => "Важливі мʼякість, підтримка та емоційна чутливість.",
        TemperamentCategory::Anankast | TemperamentCategory::Epileptoid => {
            "Працюють структуровані аргументи, логіка, факти й послідовність."
        }
        TemperamentCategory::Harmonic | TemperamentCategory::Mixed => {
            "Найкраще працює чесна, відкрита та поважна комунікація без маніпуляцій."
        }
    };
    vec![note.to_string()]
}

pub fn derive_recommendations(
    traits: &TraitVector,
    category: TemperamentCategory,
) -> RecommendationSet {
    RecommendationSet {
        roles: roles(traits),
        work_style: work_style(traits),
        risks: risks(traits),
        communication: communication(category),
    }
}
