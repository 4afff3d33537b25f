use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use crate::Database;
use crate::models::{NewCounselor, NewResource};

const DEFAULT_RESOURCES: &[NewResource<'static>] = &[
    NewResource {
        title: "4-7-8 Breathing Technique",
        content: "Inhale for 4 counts, hold for 7 counts, exhale for 8 counts. Repeat 4 times.",
        kind: "exercise",
        category: "breathing",
    },
    NewResource {
        title: "5-4-3-2-1 Grounding Technique",
        content: "Name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, 1 you can taste.",
        kind: "exercise",
        category: "grounding",
    },
    NewResource {
        title: "Managing Academic Stress",
        content: "Break tasks into smaller chunks, use a planner, take regular breaks, and remember that perfection is not required.",
        kind: "article",
        category: "stress",
    },
    NewResource {
        title: "Building Healthy Sleep Habits",
        content: "Maintain a consistent sleep schedule, avoid screens 1 hour before bed, and create a relaxing bedtime routine.",
        kind: "article",
        category: "sleep",
    },
];

const DEFAULT_COUNSELORS: &[NewCounselor<'static>] = &[
    NewCounselor {
        name: "Dr. Sarah Johnson",
        email: "sarah.johnson@university.edu",
        specialization: "Anxiety & Depression",
        university: "University Counseling Center",
        availability: "Monday-Friday, 9AM-5PM",
        bio: "Licensed clinical psychologist with 10 years of experience helping students with anxiety, depression, and academic stress.",
    },
    NewCounselor {
        name: "Dr. Michael Chen",
        email: "michael.chen@university.edu",
        specialization: "Academic & Career Counseling",
        university: "University Counseling Center",
        availability: "Tuesday-Thursday, 10AM-6PM",
        bio: "Specializes in helping students navigate academic challenges, career planning, and work-life balance.",
    },
    NewCounselor {
        name: "Dr. Emily Rodriguez",
        email: "emily.rodriguez@university.edu",
        specialization: "Trauma & Crisis Intervention",
        university: "University Counseling Center",
        availability: "Monday-Wednesday-Friday, 8AM-4PM",
        bio: "Expert in trauma therapy and crisis intervention, providing immediate support for students in distress.",
    },
];

impl Database {
    /// Populate the resource library and counselor directory when they are
    /// empty. Tables that already hold rows are left alone.
    pub fn seed_defaults(&self) -> Result<()> {
        if self.count_resources()? == 0 {
            for resource in DEFAULT_RESOURCES {
                self.insert_resource(&Uuid::new_v4().to_string(), resource)?;
            }
            info!("Seeded {} default resources", DEFAULT_RESOURCES.len());
        }

        if self.count_counselors()? == 0 {
            for counselor in DEFAULT_COUNSELORS {
                self.insert_counselor(&Uuid::new_v4().to_string(), counselor)?;
            }
            info!("Seeded {} default counselors", DEFAULT_COUNSELORS.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_runs_once() {
        let db = Database::open_in_memory().unwrap();
        db.seed_defaults().unwrap();
        db.seed_defaults().unwrap();

        assert_eq!(db.count_resources().unwrap(), 4);
        assert_eq!(db.count_counselors().unwrap(), 3);
        let names: Vec<String> = db.get_counselors().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Dr. Emily Rodriguez", "Dr. Michael Chen", "Dr. Sarah Johnson"]);
    }

    #[test]
    fn existing_rows_suppress_seeding() {
        let db = Database::open_in_memory().unwrap();
        db.insert_resource("r1", &DEFAULT_RESOURCES[0]).unwrap();
        db.seed_defaults().unwrap();

        assert_eq!(db.count_resources().unwrap(), 1);
        assert_eq!(db.count_counselors().unwrap(), 3);
    }
}
