use crate::models::ChatIntent;

pub const CLASSIFIER_PROMPT: &str = "You route messages for a veterinary telemedicine app. \
If the user wants to find, locate or get directions to a nearby vet clinic, animal hospital \
or emergency vet, reply with FIND_CLINIC. For anything else reply with GENERAL. \
Reply with that single word only.";

pub const ASSISTANT_PROMPT: &str = "You are PawPal, a friendly veterinary assistant. \
Answer questions about pet health, nutrition, behaviour and care in plain language. \
When an image is attached, describe what you can see that is relevant. \
You cannot diagnose: for anything that sounds urgent or serious, tell the owner to book \
a consultation with a vet. Keep answers short.";

pub const FIND_CLINIC_NOTE: &str = "Looking for clinics near you.";

/// Read the classifier's one-word answer. Anything unexpected is GENERAL.
pub fn parse_intent(classifier_reply: &str) -> ChatIntent {
    let word = classifier_reply
        .trim()
        .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .to_ascii_uppercase();

    if word == "FIND_CLINIC" {
        ChatIntent::FindClinic
    } else {
        ChatIntent::General
    }
}
