//! User-facing reply text.
//!
//! All strings the flows send live here, so the handler code stays
//! readable and the wording stays in one place.

// Registration
pub const REGISTER_INTRO: &str =
    "Welcome to the recipe assistant!\n\nPlease enter a username to register:";
pub const REGISTER_DONE: &str = "You're all set";
pub const WELCOME_BACK: &str = "Welcome back";
pub const MENU_HINT: &str = "Here's what you can do:";

// Recipe creation
pub const PROMPT_TITLE: &str = "What's the recipe called?";
pub const PROMPT_INGREDIENTS: &str = "List the ingredients (comma separated):";
pub const PROMPT_COOKING_TIME: &str = "How long does it take to cook, in minutes?";
pub const PROMPT_SKILL_LEVEL: &str = "Pick a skill level:";
pub const PROMPT_CALORIES: &str = "Roughly how many calories per serving? (numbers only)";
pub const PROMPT_INSTRUCTIONS: &str = "Write out the cooking instructions:";
pub const PROMPT_HAS_VOICE: &str = "Would you like to add a voice recording of the instructions?";
pub const PROMPT_VOICE: &str = "Send your voice recording:";
pub const PROMPT_PHOTO: &str = "Send a photo of the dish (or /skip):";
pub const INVALID_NUMBER: &str = "Please enter a valid number.";
pub const RECIPE_SAVED: &str = "Recipe saved! 🎉";
pub const YES: &str = "yes";
pub const NO: &str = "no";
pub const SKILL_BEGINNER: &str = "beginner";
pub const SKILL_INTERMEDIATE: &str = "intermediate";
pub const SKILL_PROFESSIONAL: &str = "professional";

// Recipe editing
pub const EDIT_MENU_PROMPT: &str = "Which part of the recipe would you like to edit?";
pub const EDIT_PROMPT_TITLE: &str = "Enter the new title:";
pub const EDIT_PROMPT_INGREDIENTS: &str = "Enter the new ingredients (comma separated):";
pub const EDIT_PROMPT_COOKING_TIME: &str = "Enter the new cooking time in minutes:";
pub const EDIT_PROMPT_SKILL_LEVEL: &str = "Pick the new skill level:";
pub const EDIT_PROMPT_CALORIES: &str = "Enter the new calorie count:";
pub const EDIT_PROMPT_INSTRUCTIONS: &str = "Enter the new instructions:";
pub const EDIT_PROMPT_PHOTO: &str = "Send the new photo (or /skip to leave it):";
pub const EDIT_PROMPT_VOICE: &str = "Send the new voice recording (or /skip to leave it):";
pub const EDIT_SAVED: &str = "updated! ✅";
pub const EDIT_CANCELLED: &str = "Edit cancelled.";
pub const EDIT_SKIPPED: &str = "Left as it was.";
pub const PHOTO_REMOVED: &str = "Photo removed. ✅";
pub const VOICE_REMOVED: &str = "Voice recording removed. ✅";

// Edit menu buttons
pub const BUTTON_TITLE: &str = "Title";
pub const BUTTON_INGREDIENTS: &str = "Ingredients";
pub const BUTTON_COOKING_TIME: &str = "Cooking time";
pub const BUTTON_SKILL_LEVEL: &str = "Skill level";
pub const BUTTON_CALORIES: &str = "Calories";
pub const BUTTON_INSTRUCTIONS: &str = "Instructions";
pub const BUTTON_ADD_PHOTO: &str = "➕ Add photo";
pub const BUTTON_CHANGE_PHOTO: &str = "🔄 Change photo";
pub const BUTTON_REMOVE_PHOTO: &str = "❌ Remove photo";
pub const BUTTON_ADD_VOICE: &str = "➕ Add voice";
pub const BUTTON_CHANGE_VOICE: &str = "🔄 Change voice";
pub const BUTTON_REMOVE_VOICE: &str = "❌ Remove voice";
pub const BUTTON_CANCEL: &str = "❌ Cancel";
pub const BUTTON_VIEW: &str = "👁 View";
pub const BUTTON_EDIT: &str = "✏️ Edit";

// BMI
pub const PROMPT_HEIGHT: &str = "Enter your height in centimeters:";
pub const PROMPT_WEIGHT: &str = "Enter your weight in kilograms:";
pub const BMI_UNDERWEIGHT: &str = "Suggestion: focus on protein-rich, higher-calorie dishes.";
pub const BMI_BALANCED: &str = "Suggestion: keep up a balanced diet with plenty of variety.";
pub const BMI_OVERWEIGHT: &str = "Suggestion: focus on lighter, lower-calorie dishes.";

// Search
pub const SEARCH_INTRO: &str = "🔍 Recipe search\n\nEnter a term to search titles, ingredients, \
                                and instructions:";
pub const SEARCH_TOO_SHORT: &str = "Please enter at least 2 characters.";
pub const SEARCH_NO_RESULTS: &str =
    "🔍 Nothing found!\nTry another term, or /cancel to stop searching.";
pub const SEARCH_AGAIN_HINT: &str = "Search for something else, or /cancel to stop.";

// Browsing
pub const MY_RECIPES_HEADER: &str = "📚 Your recipes:";
pub const NO_RECIPES_YET: &str = "You haven't saved any recipes yet! 🤔";
pub const MEDIA_UNAVAILABLE: &str = "(media unavailable)";
pub const UNKNOWN_CHEF: &str = "unknown";

// Moderation
pub const BAN_USAGE: &str = "Usage: /ban_user <actor-id>";
pub const BAN_REASON_PROMPT: &str = "Why is this user being banned? Enter a short reason:";
pub const BAN_DONE: &str = "User banned. ✅";
pub const BAN_UNKNOWN_USER: &str = "No such user.";
pub const BAN_NOTICE: &str = "You have been banned from the recipe assistant.";

// Shared
pub const CANCELLED: &str = "Operation cancelled.";
