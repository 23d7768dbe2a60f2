//! Built-in seed data used as the mirror's initial content when the durable
//! store is unreachable at startup (fallback mode).

use chrono::Utc;

use crate::card::{CardRecord, DEFAULT_THEME};

fn card(
  id: i64,
  first: &str,
  last: &str,
  title: &str,
  email: &str,
  phone: &str,
  website: &str,
  active: bool,
) -> CardRecord {
  CardRecord {
    id:         Some(id),
    first_name: first.to_string(),
    last_name:  last.to_string(),
    company:    Some("Tapcard".to_string()),
    job_title:  Some(title.to_string()),
    email:      Some(email.to_string()),
    phone:      Some(phone.to_string()),
    website:    Some(website.to_string()),
    card_code:  crate::alloc::next_card_code(id),
    is_active:  active,
    created_at: Utc::now(),
    theme:      DEFAULT_THEME.to_string(),
  }
}

/// The eight demo cards shipped with the service. Ids 4 and 7 are
/// deactivated so the Gone path is exercisable out of the box.
pub fn seed_cards() -> Vec<CardRecord> {
  vec![
    card(
      1,
      "John",
      "Doe",
      "Senior Developer",
      "john@tapcard.dev",
      "+33 1 23 45 67 89",
      "https://johndoe.dev",
      true,
    ),
    card(
      2,
      "Jane",
      "Smith",
      "UX/UI Designer",
      "jane@tapcard.dev",
      "+33 1 23 45 67 90",
      "https://janesmith.pro",
      true,
    ),
    card(
      3,
      "Pierre",
      "Martin",
      "Project Manager",
      "pierre@tapcard.dev",
      "+33 1 23 45 67 91",
      "https://pierremartin.fr",
      true,
    ),
    card(
      4,
      "Marie",
      "Dubois",
      "Business Consultant",
      "marie@tapcard.dev",
      "+33 1 23 45 67 92",
      "https://mariedubois.com",
      false,
    ),
    card(
      5,
      "Ahmed",
      "Ben Ali",
      "Mobile Developer",
      "ahmed@tapcard.dev",
      "+33 1 23 45 67 93",
      "https://ahmedbenali.net",
      true,
    ),
    card(
      6,
      "Sarah",
      "Johnson",
      "Data Analyst",
      "sarah@tapcard.dev",
      "+33 1 23 45 67 94",
      "https://sarahjohnson.io",
      true,
    ),
    card(
      7,
      "Lucas",
      "Garcia",
      "DevOps Engineer",
      "lucas@tapcard.dev",
      "+33 1 23 45 67 95",
      "https://lucasgarcia.es",
      false,
    ),
    card(
      8,
      "Emma",
      "Wilson",
      "Marketing Manager",
      "emma@tapcard.dev",
      "+33 1 23 45 67 96",
      "https://emmawilson.uk",
      true,
    ),
  ]
}
