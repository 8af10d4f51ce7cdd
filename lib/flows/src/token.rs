//! Typed callback-token codec.
//!
//! Keyboard buttons carry structured tokens like `edit_field_<id>_<field>`.
//! The engine dispatches on the prefix only; handlers decode the rest
//! through this module, so malformed tokens fail in one validated place
//! instead of ad-hoc string splitting. Every token family gets a distinct
//! prefix so prefix dispatch stays unambiguous.

use saffron_core::{MediaKind, RecipeId};
use std::fmt;

/// Prefix for tokens that open the edit flow for a recipe.
pub const EDIT_RECIPE: &str = "edit_recipe_";
/// Prefix for tokens that pick a field in the edit menu.
pub const EDIT_FIELD: &str = "edit_field_";
/// Prefix for tokens that remove a media field.
pub const EDIT_REMOVE: &str = "edit_remove_";
/// Prefix for tokens that cancel the edit menu.
pub const EDIT_CANCEL: &str = "edit_cancel_";
/// Prefix for tokens that show a recipe's details.
pub const VIEW_RECIPE: &str = "view_recipe_";

/// The editable fields of a recipe, as addressed by edit-menu tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Title,
    Ingredients,
    CookingTime,
    SkillLevel,
    Calories,
    Instructions,
    Photo,
    Voice,
}

impl EditField {
    /// The token segment naming this field.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Ingredients => "ingredients",
            Self::CookingTime => "time",
            Self::SkillLevel => "level",
            Self::Calories => "calories",
            Self::Instructions => "instructions",
            Self::Photo => "photo",
            Self::Voice => "voice",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(Self::Title),
            "ingredients" => Some(Self::Ingredients),
            "time" => Some(Self::CookingTime),
            "level" => Some(Self::SkillLevel),
            "calories" => Some(Self::Calories),
            "instructions" => Some(Self::Instructions),
            "photo" => Some(Self::Photo),
            "voice" => Some(Self::Voice),
            _ => None,
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Errors from token decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not start with a known prefix.
    UnknownPrefix { token: String },
    /// The token starts with a known prefix but the rest does not parse.
    Malformed { token: String, reason: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPrefix { token } => write!(f, "unknown callback token: {token}"),
            Self::Malformed { token, reason } => {
                write!(f, "malformed callback token '{token}': {reason}")
            }
        }
    }
}

impl std::error::Error for TokenError {}

/// A decoded callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackToken {
    /// Open the edit flow for a recipe.
    EditRecipe(RecipeId),
    /// Edit one field of a recipe.
    EditField(RecipeId, EditField),
    /// Remove a recipe's photo or voice recording.
    RemoveMedia(RecipeId, MediaKind),
    /// Leave the edit menu.
    EditCancel(RecipeId),
    /// Show a recipe's details.
    ViewRecipe(RecipeId),
}

impl CallbackToken {
    /// Encodes the token into its wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::EditRecipe(id) => format!("{EDIT_RECIPE}{id}"),
            Self::EditField(id, field) => format!("{EDIT_FIELD}{id}_{}", field.key()),
            Self::RemoveMedia(id, kind) => format!("{EDIT_REMOVE}{id}_{kind}"),
            Self::EditCancel(id) => format!("{EDIT_CANCEL}{id}"),
            Self::ViewRecipe(id) => format!("{VIEW_RECIPE}{id}"),
        }
    }

    /// Decodes a token from its wire form.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] for unknown prefixes or malformed
    /// suffixes.
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        if let Some(rest) = token.strip_prefix(EDIT_FIELD) {
            let (id, key) = split_id_and_tail(token, rest)?;
            let field = EditField::from_key(key).ok_or_else(|| TokenError::Malformed {
                token: token.to_string(),
                reason: format!("unknown field '{key}'"),
            })?;
            return Ok(Self::EditField(id, field));
        }
        if let Some(rest) = token.strip_prefix(EDIT_REMOVE) {
            let (id, key) = split_id_and_tail(token, rest)?;
            let kind = match key {
                "photo" => MediaKind::Photo,
                "voice" => MediaKind::Voice,
                other => {
                    return Err(TokenError::Malformed {
                        token: token.to_string(),
                        reason: format!("unknown media slot '{other}'"),
                    });
                }
            };
            return Ok(Self::RemoveMedia(id, kind));
        }
        if let Some(rest) = token.strip_prefix(EDIT_RECIPE) {
            return Ok(Self::EditRecipe(parse_id(token, rest)?));
        }
        if let Some(rest) = token.strip_prefix(EDIT_CANCEL) {
            return Ok(Self::EditCancel(parse_id(token, rest)?));
        }
        if let Some(rest) = token.strip_prefix(VIEW_RECIPE) {
            return Ok(Self::ViewRecipe(parse_id(token, rest)?));
        }
        Err(TokenError::UnknownPrefix {
            token: token.to_string(),
        })
    }
}

fn parse_id(token: &str, raw: &str) -> Result<RecipeId, TokenError> {
    raw.parse().map_err(|err| TokenError::Malformed {
        token: token.to_string(),
        reason: format!("bad recipe id: {err}"),
    })
}

/// Splits `<prefix-less rest>` into the recipe id and the trailing
/// segment. The id's display form is `rcp_<ulid>` and a ULID never
/// contains an underscore, so the last underscore separates the two.
fn split_id_and_tail<'a>(token: &str, rest: &'a str) -> Result<(RecipeId, &'a str), TokenError> {
    let (raw_id, tail) = rest.rsplit_once('_').ok_or_else(|| TokenError::Malformed {
        token: token.to_string(),
        reason: "missing field segment".to_string(),
    })?;
    Ok((parse_id(token, raw_id)?, tail))
}
