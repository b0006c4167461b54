use crate::models::{Lead, LeadStatus};

fn lead(
    id: &str,
    name: &str,
    company: &str,
    email: &str,
    source: &str,
    score: i64,
    status: LeadStatus,
) -> Lead {
    Lead {
        id: id.to_string(),
        name: name.to_string(),
        company: company.to_string(),
        email: email.to_string(),
        source: source.to_string(),
        score,
        status,
    }
}

/// Fixed lead list handed to the first load; stands in for an external data
/// collaborator.
pub fn seed_leads() -> Vec<Lead> {
    vec![
        lead(
            "lead-1",
            "Jane Cooper",
            "Acme Corp",
            "jane.cooper@acme.com",
            "Web Form",
            92,
            LeadStatus::New,
        ),
        lead(
            "lead-2",
            "Wade Warren",
            "Globex",
            "wade.warren@globex.com",
            "Referral",
            88,
            LeadStatus::Contacted,
        ),
        lead(
            "lead-3",
            "Esther Howard",
            "Initech",
            "esther.howard@initech.com",
            "Cold Call",
            74,
            LeadStatus::New,
        ),
        lead(
            "lead-4",
            "Cameron Williamson",
            "Umbrella Health",
            "cameron.w@umbrella.example",
            "Trade Show",
            81,
            LeadStatus::Qualified,
        ),
        lead(
            "lead-5",
            "Brooklyn Simmons",
            "Stark Industries",
            "brooklyn.simmons@stark.io",
            "Web Form",
            67,
            LeadStatus::Contacted,
        ),
        lead(
            "lead-6",
            "Leslie Alexander",
            "Wayne Enterprises",
            "leslie.a@wayne.example",
            "LinkedIn",
            95,
            LeadStatus::New,
        ),
        lead(
            "lead-7",
            "Guy Hawkins",
            "Hooli",
            "guy.hawkins@hooli.example",
            "Referral",
            43,
            LeadStatus::Unqualified,
        ),
        lead(
            "lead-8",
            "Kristin Watson",
            "Pied Piper",
            "kristin.watson@piedpiper.example",
            "Webinar",
            79,
            LeadStatus::Qualified,
        ),
    ]
}
