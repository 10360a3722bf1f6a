//! Temperament "radicals" (Ponomarenko typology) and their static descriptions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of temperament categories. `Mixed` is the indeterminate fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperamentCategory {
    Excitable,
    Anankast,
    Sensitive,
    Epileptoid,
    Hysteroid,
    Harmonic,
    Mixed,
}

/// Display metadata for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperamentInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub short: &'static str,
    pub description: &'static str,
}

static REGISTRY: [TemperamentInfo; 7] = [
    TemperamentInfo {
        key: "excitable",
        name: "Збудливий",
        short: "Енергійність, прямота, швидкі й інтенсивні реакції",
        description: "Людина діє швидко й рішуче, легко заводиться і так само швидко \
            відходить. Добре почувається там, де потрібна енергія та натиск, але погано \
            переносить обмеження й повільність оточення. Потребує чітких меж і \
            можливості розрядити напругу через дію.",
    },
    TemperamentInfo {
        key: "anankast",
        name: "Педантичний (ананкаст)",
        short: "Системність, обережність, орієнтація на правила",
        description: "Схильність до порядку, планування та ретельної перевірки. Рішення \
            ухвалює після аналізу, не любить імпровізації та раптових змін. Надійний \
            виконавець у процесах, де важливі точність і відповідальність.",
    },
    TemperamentInfo {
        key: "sensitive",
        name: "Емотивний (сенситивний)",
        short: "Чутливість, емпатія, глибоке переживання подій",
        description: "Тонко відчуває настрій інших людей, цінує теплі стосунки та \
            підтримку. Болісно сприймає критику й конфлікти, може довго переживати \
            невдачі. Найкраще розкривається в атмосфері довіри.",
    },
    TemperamentInfo {
        key: "epileptoid",
        name: "Застрягаючий (епілептоїд)",
        short: "Наполегливість, контроль, вимогливість",
        description: "Цілеспрямованість і вольовий стиль поведінки. Цінує ієрархію та \
            власні принципи, довго памʼятає образи та незавершені справи. Ефективний \
            там, де потрібні дисципліна й доведення задач до результату.",
    },
    TemperamentInfo {
        key: "hysteroid",
        name: "Демонстративний (істероїд)",
        short: "Артистизм, потреба у визнанні, яскравість",
        description: "Любить бути в центрі уваги, легко встановлює контакт і вміє \
            справити враження. Гнучкий у спілкуванні, креативний, проте чутливий до \
            відсутності визнання та рутинних задач.",
    },
    TemperamentInfo {
        key: "harmonic",
        name: "Гармонійний",
        short: "Збалансованість, стабільність, адаптивність",
        description: "Риси виражені помірно й узгоджено між собою. Людина спокійно \
            реагує на стрес, легко адаптується до різних ролей та команд і рідко \
            впадає в крайнощі.",
    },
    TemperamentInfo {
        key: "mixed",
        name: "Змішаний",
        short: "Поєднання рис кількох радикалів без явного лідера",
        description: "Жоден радикал не домінує достатньо чітко. Поведінка залежить від \
            ситуації: у різних умовах можуть проявлятися риси різних типів. Для точнішої \
            оцінки варто проаналізувати кілька фото.",
    },
];

impl TemperamentCategory {
    pub const ALL: [TemperamentCategory; 7] = [
        TemperamentCategory::Excitable,
        TemperamentCategory::Anankast,
        TemperamentCategory::Sensitive,
        TemperamentCategory::Epileptoid,
        TemperamentCategory::Hysteroid,
        TemperamentCategory::Harmonic,
        TemperamentCategory::Mixed,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Self {
        Self::ALL.get(idx).copied().unwrap_or(TemperamentCategory::Mixed)
    }

    pub fn key(&self) -> &'static str {
        self.info().key
    }

    /// Registry lookup; unknown keys resolve to `Mixed`.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .unwrap_or(TemperamentCategory::Mixed)
    }

    pub fn info(&self) -> &'static TemperamentInfo {
        &REGISTRY[self.index()]
    }
}

impl fmt::Display for TemperamentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}
