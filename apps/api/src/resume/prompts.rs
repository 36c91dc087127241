// Resume analysis prompt template.

use crate::llm_client::prompts::JSON_OUTPUT_RULES;

const RESUME_ANALYSIS_PROMPT: &str = r#"You are an AI Interview Assistant.

STEP 1: Extract structured information from the resume:
- Name
- Email
- Phone
- Summary
- Skills (as list)
- Education
- Projects
- Internships
- Work Experience
- Strengths
- Hobbies

STEP 2: Based on the extracted information, generate:
- 5 Technical Interview Questions
- 3 HR Questions
- 2 Behavioral Questions
- 1 Random Group Discussion (GD) topic that is NOT related to technical skills, programming, software, or the candidate's resume domain

Difficulty and style requirements:
- Keep all interview questions easy and beginner-friendly.
- Use simple, clear language.
- Avoid advanced or tricky wording.

{output_rules}
- `skills`, `technical`, `hr`, and `behavioral` must be arrays of strings.
- `group_discussion.topic` and `group_discussion.expected_answer` must be non-empty strings.

Return ONLY valid JSON in this format:

{
  "extracted_information": {
      "name": "",
      "email": "",
      "phone": "",
      "summary": "",
      "skills": [],
      "education": "",
      "projects": "",
      "internships": "",
      "work_experience": "",
      "strengths": "",
      "hobbies": ""
  },
  "interview_questions": {
      "technical": [],
      "hr": [],
      "behavioral": []
  },
  "group_discussion": {
      "topic": "",
      "expected_answer": ""
  }
}

Resume:
{resume_text}
"#;

pub fn build_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT
        .replace("{output_rules}", JSON_OUTPUT_RULES)
        .replace("{resume_text}", resume_text)
}
