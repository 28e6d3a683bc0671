use serde::{Deserialize, Serialize};

use super::domain::ScreeningType;

/// Patient-facing description of a screened condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionInfo {
    pub name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub prevention: Vec<String>,
}

impl ConditionInfo {
    pub fn for_type(screening_type: ScreeningType) -> Self {
        match screening_type {
            ScreeningType::Heart => Self::from_static(
                HEART_NAME,
                HEART_DESCRIPTION,
                &HEART_SYMPTOMS,
                &HEART_PREVENTION,
            ),
            ScreeningType::Diabetes => Self::from_static(
                DIABETES_NAME,
                DIABETES_DESCRIPTION,
                &DIABETES_SYMPTOMS,
                &DIABETES_PREVENTION,
            ),
            ScreeningType::Pneumonia => Self::from_static(
                PNEUMONIA_NAME,
                PNEUMONIA_DESCRIPTION,
                &PNEUMONIA_SYMPTOMS,
                &PNEUMONIA_PREVENTION,
            ),
        }
    }

    fn from_static(
        name: &str,
        description: &str,
        symptoms: &[&str],
        prevention: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            symptoms: symptoms.iter().map(|item| item.to_string()).collect(),
            prevention: prevention.iter().map(|item| item.to_string()).collect(),
        }
    }
}

const HEART_NAME: &str = "Heart Disease";
const HEART_DESCRIPTION: &str = "Heart disease describes a range of conditions that affect your heart, including coronary artery disease, heart rhythm problems, and heart defects.";
const HEART_SYMPTOMS: [&str; 4] = [
    "Chest pain or discomfort",
    "Shortness of breath",
    "Pain in the neck, jaw, throat, upper abdomen or back",
    "Numbness or weakness in legs or arms",
];
const HEART_PREVENTION: [&str; 5] = [
    "Maintain healthy blood pressure and cholesterol levels",
    "Exercise regularly",
    "Eat a heart-healthy diet",
    "Maintain a healthy weight",
    "Quit smoking and limit alcohol",
];

const DIABETES_NAME: &str = "Diabetes";
const DIABETES_DESCRIPTION: &str = "Diabetes is a chronic disease that occurs when the pancreas is no longer able to make insulin, or when the body cannot make good use of the insulin it produces.";
const DIABETES_SYMPTOMS: [&str; 5] = [
    "Frequent urination",
    "Increased thirst",
    "Unexplained weight loss",
    "Extreme hunger",
    "Blurred vision",
];
const DIABETES_PREVENTION: [&str; 5] = [
    "Maintain a healthy weight",
    "Be physically active",
    "Eat a healthy diet with plenty of fruits and vegetables",
    "Limit alcohol and sugary beverages",
    "Quit smoking",
];

const PNEUMONIA_NAME: &str = "Pneumonia";
const PNEUMONIA_DESCRIPTION: &str = "Pneumonia is an infection that inflames the air sacs in one or both lungs. The air sacs may fill with fluid or pus, causing cough with phlegm, fever, chills, and difficulty breathing.";
const PNEUMONIA_SYMPTOMS: [&str; 8] = [
    "Chest pain when breathing or coughing",
    "Confusion or changes in mental awareness (in adults age 65 and older)",
    "Cough, which may produce phlegm",
    "Fatigue",
    "Fever, sweating and shaking chills",
    "Lower than normal body temperature (in adults older than age 65 and people with weak immune systems)",
    "Nausea, vomiting or diarrhea",
    "Shortness of breath",
];
const PNEUMONIA_PREVENTION: [&str; 5] = [
    "Get vaccinated",
    "Ensure children get vaccinated",
    "Practice good hygiene",
    "Don't smoke",
    "Keep your immune system strong",
];
