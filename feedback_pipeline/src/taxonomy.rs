//! Keyword-based department classification.
//!
//! A comment is assigned to the first department (in declaration order) that shares at least
//! one keyword with it. Matching is done on whitespace-separated lowercase tokens only: there is
//! no stemming, no substring matching, and keywords containing spaces (`"air conditioning"`)
//! never match.

use log::debug;
use std::collections::HashSet;

/// The department returned when no keyword matches.
pub const GENERAL_SERVICES: &str = "General Services";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Department {
    pub name: String,
    keywords: HashSet<String>,
}

impl Department {
    /// Keywords are lowercased and trimmed. Empty keywords are dropped.
    pub fn new<S: AsRef<str>>(name: &str, keywords: &[S]) -> Department {
        Department {
            name: name.to_string(),
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &HashSet<String> {
        &self.keywords
    }

    fn matches(&self, tokens: &HashSet<&str>) -> bool {
        self.keywords.iter().any(|k| tokens.contains(k.as_str()))
    }
}

/// The ordered mapping from department name to its keyword set.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Taxonomy {
    departments: Vec<Department>,
    catch_all: String,
}

impl Taxonomy {
    pub fn new(departments: Vec<Department>, catch_all: &str) -> Taxonomy {
        Taxonomy {
            departments,
            catch_all: catch_all.to_string(),
        }
    }

    /// The pilgrimage taxonomy, obtained from a thematic analysis of the feedback.
    pub fn pilgrimage() -> Taxonomy {
        let departments = PILGRIMAGE_DEPARTMENTS
            .iter()
            .map(|&(name, kws)| Department::new(name, kws))
            .collect();
        Taxonomy::new(departments, GENERAL_SERVICES)
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// All the labels this taxonomy can return, in declaration order, the catch-all last.
    pub fn labels(&self) -> Vec<String> {
        let mut res: Vec<String> = self.departments.iter().map(|d| d.name.clone()).collect();
        if !res.contains(&self.catch_all) {
            res.push(self.catch_all.clone());
        }
        res
    }

    /// Returns the department of a comment.
    pub fn classify(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();
        let tokens: HashSet<&str> = lowered.split_whitespace().collect();
        let res = self
            .departments
            .iter()
            .find(|d| d.matches(&tokens))
            .map(|d| d.name.as_str())
            .unwrap_or(self.catch_all.as_str());
        debug!("classify: {:?} -> {:?}", text, res);
        res
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Taxonomy::pilgrimage()
    }
}

// Keywords with spaces are kept as found in the thematic analysis, even though they never match.
const PILGRIMAGE_DEPARTMENTS: &[(&str, &[&str])] = &[
    (
        "Transport & Travel",
        &[
            "bus", "car", "road", "roads", "transport", "transportation", "ride", "route", "driver",
            "passengers", "commute", "shuttles", "travelling", "departed", "departure", "arrivals",
            "mobility", "scheduled", "delays", "punctuality", "traffic", "jam", "stops", "rerouted",
            "infrastructure", "transitions", "retarded", "crowding", "station", "vehicle",
            "vehicles", "moved", "traveling", "transported", "drivers", "bypass", "walking", "walk",
            "passenger", "landing", "tracks", "journey", "logistics", "international", "flights",
            "flight", "maps", "schedule", "timeline", "clock", "delay", "hurry", "missed",
            "operations", "travel", "update", "coordination", "timeliness", "planning", "rapid",
            "stuck", "taxi", "train", "transporting", "transit", "departures", "rides", "fleet",
            "highway", "transfers", "routes", "waiting", "luggage",
        ],
    ),
    (
        "Accommodation & Facilities",
        &[
            "accommodation", "facilities", "residences", "housing", "hotels", "hoteling", "rooms",
            "house", "homes", "sites", "locations", "residential", "setup", "availability", "space",
            "relaxing", "furniture", "utilities", "amenities", "bed", "bedding", "bedroom",
            "interior", "carpets", "floor", "equipment", "units", "spacious", "open", "quarters",
            "water", "electricity", "surfaces", "ventilation", "pillows", "lobby", "cleanliness",
            "air conditioning", "sanitation", "center", "laundry", "sinks", "bathroom", "bathrooms",
            "baths", "office", "built", "swimming", "stable", "shower", "resort", "pools",
            "lodging", "parking", "belongings", "wall", "windows", "door", "pool", "usability",
            "station", "linen", "mattress", "lighting", "washroom", "toiletries", "shampoo", "soap",
            "towels", "minibar", "decor", "chairs", "tables", "tiles", "wallpaper", "upholstery",
            "signage", "reception", "soundproofing", "layout",
        ],
    ),
    (
        "Hotel Room Conditions & Cleanliness",
        &[
            "room", "rooms", "cleanliness", "housekeeping", "tidy", "stains", "stained", "unclean",
            "dirt", "dusty", "smell", "odor", "bathrooms", "toilet", "bathroom", "bedding", "bed",
            "washed", "hygiene", "hygienic", "towels", "garbage", "neat", "windows", "sheets",
            "cleaning", "maintained", "spider", "insects", "bath", "pillows", "air", "ventilation",
            "broken", "damaged", "uncleanliness", "dirty", "poorly", "shower", "wall", "noise",
            "silence", "dust", "floor", "neatness", "sanitation", "clean", "sanitary", "spotless",
            "unkempt", "mold", "dustbin", "contamination", "sticky", "pests", "infestation",
            "mildew", "upkeep", "washing", "odors", "fresh", "polished", "smelly",
        ],
    ),
    (
        "Staff Attitude & Support",
        &[
            "staff", "employees", "officials", "officers", "support", "guided", "guiding",
            "cooperation", "cooperative", "teamwork", "kindness", "friendly", "friendliness",
            "warmth", "patient", "compassion", "courteous", "respectful", "caring", "communicated",
            "helpful", "attitude", "sincerity", "dedication", "behaved", "temperament", "humility",
            "accountability", "willingness", "listening", "approachable", "respect",
            "encouragement", "supporter", "assisted", "treatment", "service", "thankfulness",
            "interacting", "greeted", "greetings", "counseling", "devotion", "understanding",
            "cheerful", "tact", "assisting", "manners", "helping", "counselor", "training",
            "trained", "assistant", "receptionist", "team", "employee", "welcomed", "praised",
            "communicative", "proactive", "responsive", "rude", "supportive", "professional",
            "empathetic", "attentive", "knowledgeable", "honest", "enthusiastic", "skilled",
            "motivated",
        ],
    ),
    (
        "Service Efficiency & Time Management",
        &[
            "schedule", "scheduling", "timeliness", "timing", "deadlines", "delay", "delays",
            "waiting", "waited", "organizing", "management", "handling", "operation", "workflow",
            "responsiveness", "immediate", "quickly", "on-time", "execution", "repetition",
            "slowness", "inconsistency", "registration", "flow", "disruptions", "interruptions",
            "missed", "adherence", "smoothly", "performed", "chaos", "confusion", "complicated",
            "implementation", "process", "processes", "timely", "executed", "managing",
            "effectiveness", "efficiency", "deadline", "responses", "quick", "prompt", "stuck",
            "updated", "systematically", "performance", "task", "clock", "timetable", "plan",
            "response", "immediately", "repeated", "completed", "finishing", "pauses", "backlog",
            "punctual", "rushed", "slow", "efficient", "organized", "coordinated", "interrupted",
            "postponement", "queue", "continuity", "smooth", "speed", "hiccups", "downtime",
            "troubleshooting", "deployment",
        ],
    ),
    (
        "Food Quality & Dining",
        &[
            "food", "foods", "meal", "meals", "dish", "dishes", "taste", "tasty", "delicious",
            "flavors", "flavor", "freshness", "fresh", "cooked", "cooking", "breakfast", "dinner",
            "eating", "restaurant", "salty", "hygiene", "hot", "cold", "presentation", "smells",
            "ingredients", "baked", "portions", "nutrition", "served", "serving", "snack", "drinks",
            "seafood", "seasoning", "bland", "tasteless", "spicy", "fat", "diet", "dirty", "frozen",
            "spices", "meat", "eat", "dining", "tables", "menu", "cuisine", "culinary", "stale",
            "appetizing", "salads", "soups", "sauces", "garnishes", "desserts", "calories", "vegan",
            "gluten", "organic",
        ],
    ),
    (
        "Event & Program Organization",
        &[
            "event", "events", "organized", "organizing", "program", "organizers", "setup",
            "planning", "preparation", "process", "processes", "execution", "implemented",
            "schedule", "coordination", "participation", "register", "registration", "sessions",
            "teamwork", "performance", "administration", "conducted", "flow", "success",
            "management", "timeline", "logistics", "initiative", "implementation", "session",
            "structure", "systematic", "pre-planned", "agenda", "leadership", "executed",
            "contribution", "teams", "completed", "briefing", "rounds", "conferences",
            "organizational", "coordinated", "managed", "seminars", "involved", "participant",
            "participants", "organizations", "cooperation", "governance", "task", "activities",
            "scheduling", "hosting", "managing", "visitor", "group", "volunteers", "entertainment",
            "workshops", "speakers",
        ],
    ),
];
