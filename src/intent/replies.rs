//! Reply text for locally handled intents

use super::catalog::Catalog;
use super::context::SessionMemory;
use super::normalize::Language;
use std::fmt::Write;

fn join(values: &[&str], language: Language) -> String {
    match language {
        Language::Arabic => values.join("، "),
        Language::English => values.join(", "),
    }
}

pub(super) fn empty_utterance(language: Language) -> String {
    match language {
        Language::Arabic => "🤔 لم أسمع أي شيء. ممكن تعيد تاني؟".to_string(),
        Language::English => "🤔 I didn't catch that. Could you say it again?".to_string(),
    }
}

pub(super) fn list_furniture(catalog: &Catalog, language: Language) -> String {
    let mut reply = match language {
        Language::Arabic => "🪑 الأثاث المتاح:".to_string(),
        Language::English => "🪑 Available furniture:".to_string(),
    };
    for category in &catalog.furniture {
        let models: Vec<&str> = category.models.iter().map(|m| m.name.as_str()).collect();
        let label = catalog.item_label(&category.key, language);
        let _ = match language {
            Language::Arabic => write!(reply, "\n• {label} - الموديلات: {}", join(&models, language)),
            Language::English => write!(reply, "\n• {label} - models: {}", join(&models, language)),
        };
    }
    reply
}

pub(super) fn list_added(catalog: &Catalog, memory: &SessionMemory, language: Language) -> String {
    if memory.is_empty() {
        return match language {
            Language::Arabic => "🪑 مفيش قطع أثاث مضافة لحد دلوقتي.".to_string(),
            Language::English => "🪑 You haven't added any furniture yet.".to_string(),
        };
    }

    let mut reply = match language {
        Language::Arabic => "🪑 القطع اللي ضفتها:".to_string(),
        Language::English => "🪑 Furniture you added:".to_string(),
    };
    for (index, entry) in memory.entries().iter().enumerate() {
        let item = catalog.item_label(&entry.item, language);
        let color = catalog.color_label(&entry.color, language);
        let _ = match language {
            Language::Arabic => write!(reply, "\n{}. {item} - اللون: {color}", index + 1),
            Language::English => write!(reply, "\n{}. {item} - color: {color}", index + 1),
        };
    }
    reply
}

pub(super) fn nothing_to_send(language: Language) -> String {
    match language {
        Language::Arabic => "📭 القائمة فاضية، مفيش حاجة أبعتها.".to_string(),
        Language::English => "📭 Your list is empty, there is nothing to send.".to_string(),
    }
}

pub(super) fn sending(count: usize, language: Language) -> String {
    match language {
        Language::Arabic => format!("🚀 تم إرسال {count} قطعة للمشهد."),
        Language::English => format!("🚀 Sent {count} item(s) to the scene."),
    }
}

pub(super) fn list_colors(catalog: &Catalog, item: Option<&str>, language: Language) -> String {
    match item {
        Some(item) => {
            let colors: Vec<&str> = catalog
                .colors_for(item)
                .into_iter()
                .map(|c| catalog.color_label(c, language))
                .collect();
            let label = catalog.item_label(item, language);
            match language {
                Language::Arabic => format!("🎨 الألوان المتاحة لـ {label}:\n{}", join(&colors, language)),
                Language::English => format!("🎨 Colors available for {label}:\n{}", join(&colors, language)),
            }
        }
        None => {
            let colors: Vec<&str> = catalog
                .colors
                .iter()
                .map(|c| catalog.color_label(&c.name, language))
                .collect();
            match language {
                Language::Arabic => format!("🎨 كل الألوان:\n{}", join(&colors, language)),
                Language::English => format!("🎨 All colors:\n{}", join(&colors, language)),
            }
        }
    }
}

pub(super) fn list_materials(catalog: &Catalog, item: Option<&str>, language: Language) -> String {
    match item {
        Some(item) => {
            let materials: Vec<&str> = catalog
                .materials_for(item)
                .into_iter()
                .map(|m| catalog.material_label(m, language))
                .collect();
            let label = catalog.item_label(item, language);
            match language {
                Language::Arabic => format!("🛠️ الخامات المتاحة لـ {label}:\n{}", join(&materials, language)),
                Language::English => format!("🛠️ Materials available for {label}:\n{}", join(&materials, language)),
            }
        }
        None => {
            let materials: Vec<&str> = catalog
                .materials
                .iter()
                .map(|m| catalog.material_label(&m.name, language))
                .collect();
            match language {
                Language::Arabic => format!("🛠️ كل الخامات:\n{}", join(&materials, language)),
                Language::English => format!("🛠️ All materials:\n{}", join(&materials, language)),
            }
        }
    }
}

pub(super) fn help(language: Language) -> String {
    match language {
        Language::Arabic => "🛟 أقدر أساعدك في:\n\
            • إضافة قطعة: 'عايز كنبة' أو 'كرسي أسود'\n\
            • عرض الأثاث: 'الأثاث' أو 'الموديلات'\n\
            • عرض اللي ضفته: 'ضفت إيه'\n\
            • إرسال القطع للمشهد: 'ابعت'\n\
            • الألوان والخامات: 'ألوان الكنبة' أو 'خامات الكرسي'"
            .to_string(),
        Language::English => "🛟 I can help you:\n\
            • Add a piece: 'I want a sofa' or 'black chair'\n\
            • Browse furniture: 'furniture' or 'models'\n\
            • Review your list: 'what did I add'\n\
            • Send your pieces to the scene: 'send'\n\
            • Colors and materials: 'sofa colors' or 'chair materials'"
            .to_string(),
    }
}

pub(super) fn ask_color(catalog: &Catalog, item: &str, language: Language) -> String {
    let label = catalog.item_label(item, language);
    let colors = first_model_colors(catalog, item, language);
    if colors.is_empty() {
        return match language {
            Language::Arabic => format!("🪑 اخترت {label}. قولي اللون اللي تحبه."),
            Language::English => format!("🪑 You picked a {label}. Which color would you like?"),
        };
    }
    match language {
        Language::Arabic => format!("🪑 تمام! عايز {label} بأي لون؟\n🎨 الألوان المتاحة: {colors}"),
        Language::English => format!("🪑 Great! Which color for the {label}?\n🎨 Available colors: {colors}"),
    }
}

pub(super) fn reask_color(catalog: &Catalog, item: &str, language: Language) -> String {
    let label = catalog.item_label(item, language);
    let colors = first_model_colors(catalog, item, language);
    match language {
        Language::Arabic => format!("🪑 لسه مستني اللون لـ {label}.\n🎨 الألوان المتاحة: {colors}"),
        Language::English => format!("🪑 I'm still waiting for a color for the {label}.\n🎨 Available colors: {colors}"),
    }
}

pub(super) fn color_unavailable(catalog: &Catalog, item: &str, color: &str, language: Language) -> String {
    let label = catalog.item_label(item, language);
    let color = catalog.color_label(color, language);
    let colors: Vec<&str> = catalog
        .colors_for(item)
        .into_iter()
        .map(|c| catalog.color_label(c, language))
        .collect();
    let colors = join(&colors, language);
    match language {
        Language::Arabic => format!("❌ اللون {color} غير متاح لـ {label}.\n🎨 الألوان المتاحة: {colors}"),
        Language::English => format!("❌ {label} doesn't come in {color}.\n🎨 Available colors: {colors}"),
    }
}

pub(super) fn color_cancelled(catalog: &Catalog, item: &str, language: Language) -> String {
    let label = catalog.item_label(item, language);
    match language {
        Language::Arabic => format!("↩️ لغيت إضافة {label}. تقدر تبدأ من جديد في أي وقت."),
        Language::English => format!("↩️ I dropped the {label}. You can start again any time."),
    }
}

pub(super) fn added(catalog: &Catalog, item: &str, color: &str, language: Language) -> String {
    let item = catalog.item_label(item, language);
    let color = catalog.color_label(color, language);
    match language {
        Language::Arabic => format!("✅ تمت الإضافة!\n🪑 {item} باللون {color}."),
        Language::English => format!("✅ Added!\n🪑 {item} in {color}."),
    }
}

fn first_model_colors(catalog: &Catalog, item: &str, language: Language) -> String {
    let colors: Vec<&str> = catalog
        .first_model_colors(item)
        .iter()
        .map(|c| catalog.color_label(c, language))
        .collect();
    join(&colors, language)
}
