// Tender analysis prompt contract.
// This is the authoritative output shape; `schema.rs` mirrors it field for field.
// The same instructions are used for the text path and the inline-PDF path.

/// Instruction block sent with every analysis request.
pub const ANALYSIS_PROMPT: &str = r#"You are an expert government tender/procurement analyst. Analyze the following tender document and extract structured information.

Return your response as a valid JSON object with exactly these fields:

{
  "summary": {
    "projectName": "Name of the project or tender",
    "issuingAuthority": "Organization issuing the tender",
    "tenderReference": "Reference/ID number of the tender",
    "estimatedValue": "Estimated contract value",
    "currency": "Currency code (e.g. USD, EUR, ZAR)",
    "submissionDeadline": "Submission deadline date",
    "projectDuration": "Duration of the project",
    "location": "Project location",
    "sector": "Industry sector",
    "briefDescription": "Brief 2-3 sentence description of the tender"
  },
  "requirements": [
    {
      "category": "Category of requirement (e.g. Technical, Financial, Legal)",
      "requirement": "Description of the requirement",
      "mandatory": true,
      "priority": "HIGH | MEDIUM | LOW"
    }
  ],
  "complianceChecklist": [
    {
      "item": "Compliance item description",
      "category": "Category (e.g. Documentation, Legal, Financial)",
      "critical": true
    }
  ],
  "riskFlags": [
    {
      "risk": "Description of the risk",
      "severity": "HIGH | MEDIUM | LOW",
      "recommendation": "How to mitigate this risk"
    }
  ],
  "keyDates": [
    {
      "event": "Name of the event/milestone",
      "date": "Date or timeframe"
    }
  ],
  "evaluationCriteria": [
    {
      "criterion": "Name of the evaluation criterion",
      "weight": "Weight or percentage",
      "details": "Details about what is evaluated"
    }
  ],
  "financialRequirements": {
    "bidBond": "Bid bond/guarantee requirement",
    "performanceBond": "Performance bond/guarantee requirement",
    "minimumTurnover": "Minimum annual turnover requirement",
    "otherFinancial": "Any other financial requirements"
  },
  "bidScore": {
    "score": 75,
    "recommendation": "BID",
    "reasoning": "Detailed reasoning for the bid/no-bid recommendation"
  }
}

Important instructions:
- The "score" must be a whole number between 0 and 100
- The "recommendation" must be either "BID" or "NO-BID"
- "priority" and "severity" must be exactly one of "HIGH", "MEDIUM" or "LOW"
- All arrays should have at least one item if relevant information exists
- If information is not found in the document, use "Not specified" for strings
- Return ONLY valid JSON, no markdown formatting or extra text"#;

/// Separator between the instructions and an inline document body.
pub const DOCUMENT_HEADER: &str = "\n\nTENDER DOCUMENT:\n";

/// Builds the single text request used on the text path.
pub fn text_prompt(document_text: &str) -> String {
    let mut prompt =
        String::with_capacity(ANALYSIS_PROMPT.len() + DOCUMENT_HEADER.len() + document_text.len());
    prompt.push_str(ANALYSIS_PROMPT);
    prompt.push_str(DOCUMENT_HEADER);
    prompt.push_str(document_text);
    prompt
}
