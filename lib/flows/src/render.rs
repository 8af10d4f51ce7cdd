//! Shared reply rendering: recipe previews and details, the main menu,
//! and the edit menu.

use crate::text;
use crate::token::{CallbackToken, EditField};
use chrono::{DateTime, Utc};
use saffron_core::RecipeId;
use saffron_dialogue::{Keyboard, KeyboardButton, Reply};
use saffron_store::{Profile, Recipe, RecipeFields};

pub(crate) fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Suggestion keyboard for the skill-level prompts.
pub(crate) fn skill_keyboard() -> Keyboard {
    Keyboard::new().with_row(vec![
        KeyboardButton::input(format!("🟢 {}", text::SKILL_BEGINNER)),
        KeyboardButton::input(format!("🟡 {}", text::SKILL_INTERMEDIATE)),
        KeyboardButton::input(format!("🔴 {}", text::SKILL_PROFESSIONAL)),
    ])
}

/// The main command menu shown after registration.
pub(crate) fn main_menu() -> Keyboard {
    Keyboard::new()
        .with_row(vec![
            KeyboardButton::input("/add_recipe"),
            KeyboardButton::input("/my_recipes"),
        ])
        .with_row(vec![
            KeyboardButton::input("/search_recipes"),
            KeyboardButton::input("/calculate_bmi"),
        ])
        .with_row(vec![KeyboardButton::input("/profile")])
}

/// A short recipe card with a view button, used by listings and search
/// results.
pub(crate) fn recipe_preview(recipe: &Recipe, chef: Option<&str>) -> Reply {
    let mut lines = vec![format!("🍳 {}", recipe.fields.title)];
    if let Some(chef) = chef {
        lines.push(format!("👨‍🍳 Chef: {chef}"));
    }
    lines.push(format!(
        "⏱ Cooking time: {} min",
        recipe.fields.cooking_time_minutes
    ));
    lines.push(format!("📊 Skill level: {}", recipe.fields.skill_level));
    lines.push(format!("🔥 Calories: {}", recipe.fields.calories));
    lines.push(format!("📅 Added: {}", format_date(recipe.created_at)));

    let keyboard = Keyboard::new().with_row(vec![KeyboardButton::callback(
        text::BUTTON_VIEW,
        CallbackToken::ViewRecipe(recipe.id).encode(),
    )]);

    Reply::text(lines.join("\n")).with_keyboard(keyboard)
}

/// The full recipe text shown by the view callback.
pub(crate) fn recipe_details(recipe: &Recipe) -> String {
    format!(
        "🍳 {}\n\n📝 Ingredients:\n{}\n\n👨‍🍳 Instructions:\n{}\n\n⏱ Cooking time: {} min\n📊 Skill level: {}\n🔥 Calories: {}\n📅 Added: {}",
        recipe.fields.title,
        recipe.fields.ingredients,
        recipe.fields.instructions,
        recipe.fields.cooking_time_minutes,
        recipe.fields.skill_level,
        recipe.fields.calories,
        format_date(recipe.created_at),
    )
}

/// The edit menu for a recipe: one button per field, media buttons that
/// depend on whether media is present, and a cancel button.
pub(crate) fn edit_menu(recipe_id: RecipeId, fields: &RecipeFields) -> Reply {
    let field_button = |label: &str, field: EditField| {
        KeyboardButton::callback(label, CallbackToken::EditField(recipe_id, field).encode())
    };

    let mut keyboard = Keyboard::new()
        .with_row(vec![
            field_button(text::BUTTON_TITLE, EditField::Title),
            field_button(text::BUTTON_INGREDIENTS, EditField::Ingredients),
        ])
        .with_row(vec![
            field_button(text::BUTTON_COOKING_TIME, EditField::CookingTime),
            field_button(text::BUTTON_SKILL_LEVEL, EditField::SkillLevel),
        ])
        .with_row(vec![
            field_button(text::BUTTON_CALORIES, EditField::Calories),
            field_button(text::BUTTON_INSTRUCTIONS, EditField::Instructions),
        ]);

    keyboard = if fields.photo.is_some() {
        keyboard.with_row(vec![
            field_button(text::BUTTON_CHANGE_PHOTO, EditField::Photo),
            KeyboardButton::callback(
                text::BUTTON_REMOVE_PHOTO,
                CallbackToken::RemoveMedia(recipe_id, saffron_core::MediaKind::Photo).encode(),
            ),
        ])
    } else {
        keyboard.with_row(vec![field_button(text::BUTTON_ADD_PHOTO, EditField::Photo)])
    };

    keyboard = if fields.voice.is_some() {
        keyboard.with_row(vec![
            field_button(text::BUTTON_CHANGE_VOICE, EditField::Voice),
            KeyboardButton::callback(
                text::BUTTON_REMOVE_VOICE,
                CallbackToken::RemoveMedia(recipe_id, saffron_core::MediaKind::Voice).encode(),
            ),
        ])
    } else {
        keyboard.with_row(vec![field_button(text::BUTTON_ADD_VOICE, EditField::Voice)])
    };

    keyboard = keyboard.with_row(vec![KeyboardButton::callback(
        text::BUTTON_CANCEL,
        CallbackToken::EditCancel(recipe_id).encode(),
    )]);

    Reply::text(text::EDIT_MENU_PROMPT).with_keyboard(keyboard)
}

/// The `/profile` card.
pub(crate) fn profile_card(profile: &Profile) -> String {
    let status = if profile.active {
        "active ✅"
    } else {
        "banned ❌"
    };
    format!(
        "📋 Your profile:\n\n👤 Name: {}\n🔖 Username: {}\n📅 Joined: {}\n📊 Status: {}",
        profile.display_name,
        profile.username,
        format_date(profile.joined_at),
        status,
    )
}
