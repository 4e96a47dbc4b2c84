//! Built-in reference catalogue: the seven levels, base habit stages and seed artefacts.

use crate::artefact::{Artefact, UnlockRule};
use crate::habit::{Difficulty, Habit, HabitStage, TimeOfDay};
use crate::level::Level;

const LEVEL_GAP_DAYS: u32 = 21;

fn level(
    id: &str,
    order: u32,
    title: &str,
    description: &str,
    emoji: &str,
    next_level_id: Option<&str>,
) -> Level {
    Level {
        id: id.to_string(),
        order,
        title: title.to_string(),
        description: description.to_string(),
        emoji: Some(emoji.to_string()),
        next_level_id: next_level_id.map(str::to_string),
        unlock_after_days: (order > 1 && next_level_id.is_some()).then_some(LEVEL_GAP_DAYS),
    }
}

pub fn levels() -> Vec<Level> {
    vec![
        level(
            "lvl1",
            1,
            "Энергия и базовые ресурсы",
            "Привычки, которые заряжают тело и запускают утро.",
            "🩵",
            Some("lvl2"),
        ),
        level(
            "lvl2",
            2,
            "Фокус и внимание",
            "Собираем внимание и планируем день осознанно.",
            "🧠",
            Some("lvl3"),
        ),
        level(
            "lvl3",
            3,
            "Самоконтроль и психика",
            "Укрепляем устойчивость к стрессу и внутренний контроль.",
            "🔥",
            Some("lvl4"),
        ),
        level(
            "lvl4",
            4,
            "Осознанность и рефлексия",
            "Учимся наблюдать за собой и подводить итоги.",
            "🌿",
            Some("lvl5"),
        ),
        level(
            "lvl5",
            5,
            "Организация и порядок",
            "Создаём устойчивые системы и порядок вокруг.",
            "⚙️",
            Some("lvl6"),
        ),
        level(
            "lvl6",
            6,
            "Рост и развитие",
            "Расширяем горизонты, инвестируем в навыки.",
            "🚀",
            Some("lvl7"),
        ),
        level(
            "lvl7",
            7,
            "Архитектор жизни",
            "Полная осознанность и собственная система привычек.",
            "🧩",
            None,
        ),
    ]
}

pub fn base_stages() -> Vec<HabitStage> {
    vec![
        HabitStage::new(7, "Первые ростки", "Неделя дисциплины"),
        HabitStage::new(21, "Укрепление корней", "Формирование устойчивой привычки"),
        HabitStage::new(45, "Молодое дерево", "Привычка начинает работать на тебя"),
        HabitStage::new(60, "Сильные ветви", "Глубокая интеграция в систему"),
        HabitStage::new(89, "Плодоносящее древо", "Мастерство и изобилие"),
    ]
}

fn habit_stage(id: &str, title: &str, body: &str, habit_id: &str, days: u32) -> Artefact {
    Artefact::new(
        id,
        title,
        body,
        UnlockRule::HabitStage {
            habit_id: habit_id.to_string(),
            days,
        },
    )
}

fn level_progress(id: &str, title: &str, body: &str, level_id: &str, threshold: f64) -> Artefact {
    Artefact::new(
        id,
        title,
        body,
        UnlockRule::LevelProgress {
            level_id: level_id.to_string(),
            threshold,
        },
    )
}

pub fn artefacts() -> Vec<Artefact> {
    vec![
        habit_stage(
            "art-water-7",
            "Почему важно пить воду утром",
            "Гидратация запускает обмен веществ и делает мозг яснее без кофеина.",
            "h-water",
            7,
        ),
        habit_stage(
            "art-bed-21",
            "Первая победа дня",
            "Заправленная постель формирует петлю «начал → закончил» и даёт быстрый дофамин.",
            "h-bed",
            21,
        ),
        habit_stage(
            "art-stretch-45",
            "Эластичность тела = гибкость мышления",
            "Регулярные растяжки снижают тревожность и улучшают пластичность мышления.",
            "h-stretch",
            45,
        ),
        level_progress(
            "art-level1",
            "Готов к «Фокусу и вниманию»",
            "Ты выстроил фундамент энергии, теперь переходи к управлению вниманием и задачами.",
            "lvl1",
            0.3,
        ),
        habit_stage(
            "art-journal-21",
            "Сила вечернего журнала",
            "Короткая запись закрывает день, фиксирует инсайты и снижает стресс перед сном.",
            "h-journal",
            21,
        ),
        level_progress(
            "art-level2",
            "Следующий шаг: самоконтроль",
            "Два стрика по 30 дней на уровне фокуса, и ты готов работать с самоконтролем.",
            "lvl2",
            0.3,
        ),
    ]
}

/// Starter habits of the first two levels, owned by `user_id`
pub fn starter_habits(user_id: &str) -> Vec<Habit> {
    let habit = |id: &str, level_id: &str, title: &str, difficulty, time_of_day, emoji: &str| {
        Habit::new(id, user_id, level_id, title, difficulty)
            .with_time_of_day(time_of_day)
            .with_emoji(emoji)
            .with_stages(base_stages())
    };

    vec![
        habit("h-water", "lvl1", "Стакан воды после пробуждения", Difficulty::Easy, TimeOfDay::Morning, "💧"),
        habit("h-bed", "lvl1", "Заправить постель", Difficulty::Easy, TimeOfDay::Morning, "🛏️"),
        habit("h-stretch", "lvl1", "Разминка 5–10 минут", Difficulty::Easy, TimeOfDay::Morning, "🧘"),
        habit("h-cold", "lvl1", "Контрастный душ или умывание", Difficulty::Medium, TimeOfDay::Morning, "❄️"),
        habit("h-3goals", "lvl2", "Записать три цели на день", Difficulty::Easy, TimeOfDay::Morning, "📝"),
        habit("h-no-phone", "lvl2", "Без телефона первый час", Difficulty::Medium, TimeOfDay::Morning, "📵"),
        habit("h-read10", "lvl2", "Прочитать 10 страниц", Difficulty::Medium, TimeOfDay::Day, "📚"),
        habit("h-walk15", "lvl2", "Прогулка 15 минут без гаджета", Difficulty::Easy, TimeOfDay::Day, "🚶"),
    ]
}
