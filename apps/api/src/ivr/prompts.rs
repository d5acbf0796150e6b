// Spoken prompts for the call flow, one variant per supported language.
// Keep sentences short: the gateway's speech synthesis reads them verbatim.

use crate::models::Language;

pub const NEW_CALLER_ENGLISH: &str =
    "Welcome to VoicePe, the free job-finding service. To continue in English, press 1.";

pub const NEW_CALLER_HINDI: &str = "हिंदी में जारी रखने के लिए, दो दबाएं।";

/// Store failures are always apologised for in English.
pub const SYSTEM_ERROR: &str =
    "We are sorry, but there was a system error. Please try again later.";

pub const SAVE_ERROR: &str = "Sorry, there was an error saving your details.";

pub fn returning_menu(lang: Language, skill: &str, location: &str) -> String {
    match lang {
        Language::Hindi => format!(
            "VoicePe में आपका स्वागत है। हम {location} में '{skill}' की नौकरियों की तलाश करेंगे। नई नौकरियां खोजने के लिए, एक दबाएं। अपनी जानकारी बदलने के लिए, दो दबाएं।"
        ),
        Language::English => format!(
            "Welcome back to VoicePe. We will search for '{skill}' jobs in {location}. Press 1 to find new jobs. Press 2 to update your information."
        ),
    }
}

pub fn ask_skill(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => "अपना काम बताने के लिए, कृपया बोलें। जैसे, 'प्लम्बर', 'पेंटर', या 'मजदूर'।",
        Language::English => {
            "To tell us your work, please speak. For example, 'Plumber', 'Painter', or 'Labourer'."
        }
    }
}

pub fn ask_location(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => "बहुत अच्छे। अब, कृपया अपने शहर का नाम बोलें।",
        Language::English => "Very good. Now, please speak the name of your city.",
    }
}

pub fn skill_not_caught(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => "माफ़ कीजिए, मैं समझ नहीं पाया। चलिए फिर से कोशिश करते हैं।",
        Language::English => "Sorry, I didn't catch that. Let's try again.",
    }
}

pub fn location_not_caught(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => "माफ़ कीजिए, मैं शहर का नाम समझ नहीं पाया। चलिए फिर से कोशिश करते हैं।",
        Language::English => "Sorry, I didn't catch the location. Let's try again.",
    }
}

pub fn too_many_attempts(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => {
            "माफ़ करें, हम आपकी बात समझ नहीं पाए। कृपया बाद में फिर से कॉल करें। धन्यवाद।"
        }
        Language::English => {
            "Sorry, we could not understand you. Please call again later. Thank you."
        }
    }
}

pub fn invalid_choice(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => "अमान्य विकल्प।",
        Language::English => "Invalid choice.",
    }
}

pub fn jobs_found(
    lang: Language,
    count: usize,
    skill: &str,
    location: &str,
    first_location: &str,
) -> String {
    match lang {
        Language::Hindi => format!(
            "{location} में '{skill}' के लिए {count} नौकरियां मिली हैं। पहली नौकरी '{first_location}' में है। मालिक का नंबर सुनने के लिए, एक दबाएं।"
        ),
        Language::English => format!(
            "Found {count} jobs for '{skill}' in {location}. The first job is at '{first_location}'. To hear the employer's number, press 1."
        ),
    }
}

pub fn no_jobs(lang: Language) -> &'static str {
    match lang {
        Language::Hindi => "माफ़ करें, अभी आपके लिए कोई नौकरी नहीं है। जैसे ही कोई नई नौकरी आएगी, हम आपको इसी नंबर पर कॉल करेंगे। धन्यवाद।",
        Language::English => "Sorry, there are no jobs for you right now. We will call you on this number as soon as a new job is available. Thank you.",
    }
}

pub fn contact_english(spaced_number: &str) -> String {
    format!("The contact number is {spaced_number}. I repeat, {spaced_number}.")
}

pub fn contact_hindi(spaced_number: &str) -> String {
    format!("संपर्क नंबर है {spaced_number}.")
}

/// `"9876543210"` becomes `"9 8 7 6 5 4 3 2 1 0"` so it is read one digit at
/// a time. Whitespace already in the number is dropped.
pub fn spaced_digits(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}
