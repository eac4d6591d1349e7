/// Semantic category assigned to a function name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Per-frame update loop
    Update,
    /// Calibration routines
    Calibration,
    /// One-off initialization
    Initialization,
    /// Collision or impact handling
    Collision,
    /// Grabbing and releasing objects
    Grab,
    /// Vibration / haptics
    Haptic,
    /// Rendering or display
    Rendering,
    /// Force feedback
    Force,
    /// No keyword matched, name long enough to paraphrase
    Generic,
    /// No keyword matched, name too short to paraphrase
    Utility,
}

/// Ordered rule table. The first predicate that accepts the lower-cased
/// name wins, so the order is part of the output contract.
const RULES: &[(fn(&str) -> bool, Category)] = &[
    (|name| name.contains("update"), Category::Update),
    // `StartCalibration` belongs to the calibration rule below.
    (
        |name| name.contains("start") && !name.contains("calibration"),
        Category::Initialization,
    ),
    (
        |name| ["oncollision", "collision", "impact"].iter().any(|k| name.contains(k)),
        Category::Collision,
    ),
    (|name| name.contains("grab"), Category::Grab),
    (
        |name| name.contains("vibrate") || name.contains("haptic"),
        Category::Haptic,
    ),
    (|name| name.contains("calibration"), Category::Calibration),
    (
        |name| name.contains("render") || name.contains("display"),
        Category::Rendering,
    ),
    (|name| name.contains("force"), Category::Force),
];

/// Names of this many characters or fewer fall back to [`Category::Utility`].
const MIN_GENERIC_NAME_CHARS: usize = 3;

impl Category {
    /// Fixed description for keyword categories; `None` for the fallbacks
    /// whose text depends on the name.
    #[must_use]
    pub const fn canned_description(self) -> Option<&'static str> {
        match self {
            Self::Update => Some("Called every frame to update states or visuals."),
            Self::Calibration => Some("Handles calibration logic."),
            Self::Initialization => Some("Runs once at initialization."),
            Self::Collision => Some("Responds to / processes collision or impact events."),
            Self::Grab => Some("Controls object grabbing or releasing."),
            Self::Haptic => Some("Controls haptic vibration feedback."),
            Self::Rendering => Some("Manages rendering or display logic."),
            Self::Force => Some("Computes or applies force feedback."),
            Self::Generic => None,
            Self::Utility => Some("Utility method."),
        }
    }
}

/// Assign a category to a function name (case-insensitive).
#[must_use]
pub fn categorize(function_name: &str) -> Category {
    let lowered = function_name.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(lowered.as_str()))
        .map(|(_, category)| *category)
        .unwrap_or_else(|| {
            if function_name.chars().count() > MIN_GENERIC_NAME_CHARS {
                Category::Generic
            } else {
                Category::Utility
            }
        })
}

/// Describe a function by its name. Pure: identical input always yields
/// identical text.
#[must_use]
pub fn classify(function_name: &str) -> String {
    let category = categorize(function_name);
    match category.canned_description() {
        Some(text) => text.to_string(),
        None => format!(
            "Handles logic for {}",
            function_name.to_lowercase().replace('_', " ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{categorize, classify, Category};
    use pretty_assertions::assert_eq;

    #[test]
    fn keyword_rules() {
        assert_eq!(
            classify("Update"),
            "Called every frame to update states or visuals."
        );
        assert_eq!(classify("Start"), "Runs once at initialization.");
        assert_eq!(
            classify("OnCollisionEnter"),
            "Responds to / processes collision or impact events."
        );
        assert_eq!(
            classify("ProcessImpact"),
            "Responds to / processes collision or impact events."
        );
        assert_eq!(classify("TryGrab"), "Controls object grabbing or releasing.");
        assert_eq!(classify("SendHaptics"), "Controls haptic vibration feedback.");
        assert_eq!(classify("Vibrate"), "Controls haptic vibration feedback.");
        assert_eq!(classify("RenderHand"), "Manages rendering or display logic.");
        assert_eq!(classify("SetDisplay"), "Manages rendering or display logic.");
        assert_eq!(classify("ComputeForce"), "Computes or applies force feedback.");
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(categorize("UpdateGrabForce"), Category::Update);
        assert_eq!(
            classify("UpdateGrabForce"),
            "Called every frame to update states or visuals."
        );
        assert_eq!(categorize("GrabForce"), Category::Grab);
        assert_eq!(categorize("StartCalibration"), Category::Calibration);
        assert_eq!(classify("StartCalibration"), "Handles calibration logic.");
    }

    #[test]
    fn calibration_yields_to_earlier_rules() {
        assert_eq!(
            classify("HapticCalibration"),
            "Controls haptic vibration feedback."
        );
        assert_eq!(
            classify("GrabCalibration"),
            "Controls object grabbing or releasing."
        );
        assert_eq!(
            classify("CollisionCalibration"),
            "Responds to / processes collision or impact events."
        );
        assert_eq!(categorize("UpdateCalibration"), Category::Update);
        assert_eq!(categorize("StartRecording"), Category::Initialization);
        assert_eq!(categorize("CalibrationRender"), Category::Calibration);
    }

    #[test]
    fn fallbacks() {
        assert_eq!(classify("Go"), "Utility method.");
        assert_eq!(classify("Run"), "Utility method.");
        assert_eq!(classify("Reset"), "Handles logic for reset");
        assert_eq!(
            classify("Set_Thumb_Pose"),
            "Handles logic for set thumb pose"
        );
        assert_eq!(categorize("Go"), Category::Utility);
        assert_eq!(categorize("Reset"), Category::Generic);
    }

    #[test]
    fn classification_is_deterministic() {
        for name in ["Update", "GetFingerFlexion", "Go", "OnTriggerEnter"] {
            assert_eq!(classify(name), classify(name));
        }
    }

    #[test]
    fn descriptions_are_never_empty() {
        for name in ["", "a", "UpdateX", "x_y_z_w"] {
            assert!(!classify(name).is_empty());
        }
    }
}
