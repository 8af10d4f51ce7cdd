//! Per-flow draft records and the tagged union threaded through handlers.
//!
//! A draft is constructed once by a flow's entry handler and accumulated
//! turn by turn until a terminal handler commits it (or the session dies
//! with it). Fields stay optional until the turn that fills them.

use saffron_core::{ActorId, MediaRef, RecipeId};
use saffron_dialogue::HandlerError;
use saffron_store::RecipeFields;

/// Draft captured by the registration flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    /// Display name reported by the transport on the `/start` event.
    pub display_name: Option<String>,
}

/// Draft accumulated by the recipe-creation chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub ingredients: Option<String>,
    pub cooking_time_minutes: Option<u32>,
    pub skill_level: Option<String>,
    pub calories: Option<u32>,
    pub instructions: Option<String>,
    pub voice: Option<MediaRef>,
    pub photo: Option<MediaRef>,
}

impl RecipeDraft {
    /// Converts the draft into committable fields.
    ///
    /// # Errors
    ///
    /// Returns an internal handler error naming the first missing field;
    /// reaching commit with a hole in the draft is a flow bug.
    pub fn into_fields(self) -> Result<RecipeFields, HandlerError> {
        fn missing(field: &'static str) -> HandlerError {
            HandlerError::Internal {
                reason: format!("recipe draft missing {field}"),
            }
        }

        Ok(RecipeFields {
            title: self.title.ok_or_else(|| missing("title"))?,
            ingredients: self.ingredients.ok_or_else(|| missing("ingredients"))?,
            cooking_time_minutes: self
                .cooking_time_minutes
                .ok_or_else(|| missing("cooking time"))?,
            skill_level: self.skill_level.ok_or_else(|| missing("skill level"))?,
            calories: self.calories.ok_or_else(|| missing("calories"))?,
            instructions: self.instructions.ok_or_else(|| missing("instructions"))?,
            photo: self.photo,
            voice: self.voice,
        })
    }
}

/// Draft held by the recipe-edit flow: the recipe id captured at entry
/// and a working copy of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    /// The recipe being edited, fixed at entry.
    pub recipe_id: RecipeId,
    /// Working copy of the fields, committed after every successful edit.
    pub fields: RecipeFields,
}

/// Draft accumulated by the BMI flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BmiDraft {
    /// Height in centimeters, captured by the first state.
    pub height_cm: Option<f64>,
}

/// Marker draft for the search flow; the query state keeps no data
/// between searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchDraft;

/// Draft held by the reason-collecting ban flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanDraft {
    /// The actor being banned, parsed from the entry command.
    pub target: ActorId,
}

/// The tagged union of per-flow drafts.
///
/// Sessions start [`Draft::Empty`]; the matched entry handler replaces it
/// with its flow's variant.
#[derive(Debug, Clone, Default)]
pub enum Draft {
    /// ENTRY pseudo-state draft, before any entry handler ran.
    #[default]
    Empty,
    Registration(RegistrationDraft),
    Recipe(RecipeDraft),
    Edit(EditDraft),
    Bmi(BmiDraft),
    Search(SearchDraft),
    Ban(BanDraft),
}

macro_rules! draft_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $label:literal) => {
        /// Returns the draft's inner record, or an internal error if the
        /// session carries a different flow's draft.
        pub fn $fn_name(&mut self) -> Result<&mut $ty, HandlerError> {
            match self {
                Self::$variant(draft) => Ok(draft),
                _ => Err(HandlerError::Internal {
                    reason: concat!("session draft is not a ", $label, " draft").to_string(),
                }),
            }
        }
    };
}

impl Draft {
    draft_accessor!(as_registration_mut, Registration, RegistrationDraft, "registration");
    draft_accessor!(as_recipe_mut, Recipe, RecipeDraft, "recipe");
    draft_accessor!(as_edit_mut, Edit, EditDraft, "edit");
    draft_accessor!(as_bmi_mut, Bmi, BmiDraft, "bmi");
    draft_accessor!(as_ban_mut, Ban, BanDraft, "ban");
}
