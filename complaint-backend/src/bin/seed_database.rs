// src/bin/seed_database.rs
//
// 開発用データベースを初期化してサンプルデータを投入する。
// 既存の苦情・部署・ユーザーはすべて削除される。

use complaint_backend::config::AppConfig;
use complaint_backend::db::create_db_pool;
use complaint_backend::domain::complaint_category::ComplaintCategory;
use complaint_backend::domain::complaint_model::ActiveModel as ComplaintActiveModel;
use complaint_backend::domain::complaint_priority::ComplaintPriority;
use complaint_backend::domain::complaint_status::ComplaintStatus;
use complaint_backend::domain::department_model::{
    ContactInfo, DaySchedule, SlaTarget, WorkingHours,
};
use complaint_backend::domain::geo::GeoPoint;
use complaint_backend::domain::user_role::UserRole;
use complaint_backend::domain::{
    complaint_attachment_model, complaint_model, complaint_update_model, department_model,
    department_staff_model, user_model,
};
use complaint_backend::repository::complaint_repository::{ComplaintRepository, NewComplaint};
use complaint_backend::repository::department_repository::{DepartmentRepository, NewDepartment};
use complaint_backend::repository::user_repository::{NewUser, UserRepository};
use complaint_backend::utils::jwt::JwtManager;
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use std::env;

struct SampleUser {
    name: &'static str,
    email: String,
    phone: Option<&'static str>,
    role: UserRole,
}

struct SampleComplaint {
    title: &'static str,
    description: &'static str,
    category: ComplaintCategory,
    priority: ComplaintPriority,
    is_emergency: bool,
    lng: f64,
    lat: f64,
    address: &'static str,
}

fn sample_users() -> Vec<SampleUser> {
    vec![
        SampleUser {
            name: "Admin User",
            email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@publiccare.gov".to_string()),
            phone: None,
            role: UserRole::Admin,
        },
        SampleUser {
            name: "John Doe",
            email: "john.doe@email.com".to_string(),
            phone: Some("+1-555-0101"),
            role: UserRole::Citizen,
        },
        SampleUser {
            name: "Jane Smith",
            email: "jane.smith@email.com".to_string(),
            phone: Some("+1-555-0102"),
            role: UserRole::Citizen,
        },
        SampleUser {
            name: "Mike Johnson",
            email: "mike.johnson@provider.com".to_string(),
            phone: Some("+1-555-0201"),
            role: UserRole::Provider,
        },
        SampleUser {
            name: "Sarah Wilson",
            email: "sarah.wilson@provider.com".to_string(),
            phone: Some("+1-555-0202"),
            role: UserRole::Provider,
        },
    ]
}

fn hours(weekday: (&str, &str), saturday: (&str, &str)) -> WorkingHours {
    let day = |(start, end): (&str, &str)| DaySchedule {
        start: start.to_string(),
        end: end.to_string(),
        is_closed: false,
    };
    WorkingHours {
        monday: day(weekday),
        tuesday: day(weekday),
        wednesday: day(weekday),
        thursday: day(weekday),
        friday: day(weekday),
        saturday: day(saturday),
        ..WorkingHours::default()
    }
}

fn sla(category: ComplaintCategory, response: f64, resolution: f64, emergency: f64) -> SlaTarget {
    SlaTarget {
        category,
        response_time: response,
        resolution_time: resolution,
        emergency_response_time: emergency,
    }
}

fn contact(email: &str, phone: &str, address: &str, website: &str) -> ContactInfo {
    ContactInfo {
        email: email.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        website: Some(website.to_string()),
        emergency_contact: None,
    }
}

fn sample_departments() -> Vec<NewDepartment> {
    let department = |name: &str, description: &str| NewDepartment {
        name: name.to_string(),
        description: description.to_string(),
        categories: Vec::new(),
        contact_info: contact("", "", "", ""),
        working_hours: WorkingHours::default(),
        sla: Vec::new(),
        service_areas: Vec::new(),
        tags: Vec::new(),
        head_user_id: None,
        budget_annual: None,
        budget_allocated: 0.0,
        budget_spent: 0.0,
    };

    vec![
        NewDepartment {
            categories: vec![
                ComplaintCategory::Roads,
                ComplaintCategory::Drainage,
                ComplaintCategory::StreetLights,
            ],
            contact_info: contact(
                "publicworks@city.gov",
                "+1-555-1000",
                "123 City Hall Plaza, Downtown",
                "https://city.gov/publicworks",
            ),
            working_hours: hours(("08:00", "17:00"), ("09:00", "13:00")),
            sla: vec![
                sla(ComplaintCategory::Roads, 24.0, 168.0, 4.0),
                sla(ComplaintCategory::Drainage, 12.0, 72.0, 2.0),
                sla(ComplaintCategory::StreetLights, 8.0, 48.0, 1.0),
            ],
            ..department(
                "Department of Public Works",
                "Responsible for infrastructure maintenance and development",
            )
        },
        NewDepartment {
            categories: vec![ComplaintCategory::Water, ComplaintCategory::Sanitation],
            contact_info: contact(
                "water@city.gov",
                "+1-555-2000",
                "456 Utility Street, Industrial District",
                "https://city.gov/water",
            ),
            working_hours: hours(("07:00", "16:00"), ("08:00", "12:00")),
            sla: vec![
                sla(ComplaintCategory::Water, 4.0, 24.0, 1.0),
                sla(ComplaintCategory::Sanitation, 8.0, 48.0, 2.0),
            ],
            ..department(
                "Water & Utilities Department",
                "Managing water supply, sewage, and utility services",
            )
        },
        NewDepartment {
            categories: vec![ComplaintCategory::Electricity],
            contact_info: contact(
                "electrical@city.gov",
                "+1-555-3000",
                "789 Power Avenue, Energy District",
                "https://city.gov/electrical",
            ),
            working_hours: hours(("06:00", "18:00"), ("08:00", "14:00")),
            sla: vec![sla(ComplaintCategory::Electricity, 2.0, 12.0, 0.5)],
            ..department(
                "Electrical Services Department",
                "Electrical infrastructure and power supply management",
            )
        },
    ]
}

fn sample_complaints() -> Vec<SampleComplaint> {
    vec![
        SampleComplaint {
            title: "Pothole on Main Street",
            description: "Large pothole causing damage to vehicles near the intersection of Main St and 1st Ave",
            category: ComplaintCategory::Roads,
            priority: ComplaintPriority::High,
            is_emergency: false,
            lng: -74.0060,
            lat: 40.7128,
            address: "123 Main Street",
        },
        SampleComplaint {
            title: "Water leak in residential area",
            description: "Continuous water leak from main pipe affecting multiple households",
            category: ComplaintCategory::Water,
            priority: ComplaintPriority::Critical,
            is_emergency: true,
            lng: -74.0070,
            lat: 40.7138,
            address: "456 Oak Avenue",
        },
        SampleComplaint {
            title: "Street light not working",
            description: "Street light has been out for several days, creating safety concerns",
            category: ComplaintCategory::StreetLights,
            priority: ComplaintPriority::Medium,
            is_emergency: false,
            lng: -74.0050,
            lat: 40.7118,
            address: "789 Pine Street",
        },
        SampleComplaint {
            title: "Power outage in downtown area",
            description: "Multiple buildings experiencing power outage since morning",
            category: ComplaintCategory::Electricity,
            priority: ComplaintPriority::Critical,
            is_emergency: true,
            lng: -74.0080,
            lat: 40.7148,
            address: "321 Business District",
        },
        SampleComplaint {
            title: "Garbage collection missed",
            description: "Scheduled garbage collection was missed for the third consecutive week",
            category: ComplaintCategory::Sanitation,
            priority: ComplaintPriority::Medium,
            is_emergency: false,
            lng: -74.0040,
            lat: 40.7108,
            address: "654 Residential Lane",
        },
    ]
}

/// 子テーブルから順に全件削除
async fn clear_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    complaint_attachment_model::Entity::delete_many().exec(db).await?;
    complaint_update_model::Entity::delete_many().exec(db).await?;
    complaint_model::Entity::delete_many().exec(db).await?;
    department_staff_model::Entity::delete_many().exec(db).await?;
    department_model::Entity::delete_many().exec(db).await?;
    user_model::Entity::delete_many().exec(db).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let db = create_db_pool(&config).await?;
    Migrator::up(&db, None).await?;

    let users = UserRepository::new(db.clone());
    let departments = DepartmentRepository::new(db.clone());
    let complaints = ComplaintRepository::new(db.clone());

    println!("Clearing existing data...");
    clear_database(&db).await?;

    println!("Creating users...");
    let mut created_users = Vec::new();
    for sample in sample_users() {
        let user = users
            .create(NewUser {
                name: sample.name.to_string(),
                email: sample.email,
                phone: sample.phone.map(str::to_string),
                role: sample.role,
                department_id: None,
            })
            .await?;
        println!("   Created user: {} ({})", user.name, user.role);
        created_users.push(user);
    }

    let citizens: Vec<_> = created_users
        .iter()
        .filter(|user| user.role() == UserRole::Citizen)
        .collect();
    let providers: Vec<_> = created_users
        .iter()
        .filter(|user| user.role() == UserRole::Provider)
        .collect();

    // プロバイダーを先頭の部署から順に部署長として割り当てる
    println!("Creating departments...");
    let mut created_departments = Vec::new();
    for (index, mut input) in sample_departments().into_iter().enumerate() {
        let head = providers.get(index);
        input.head_user_id = head.map(|user| user.id);

        let department = departments.create(input).await?;
        if let Some(head) = head {
            departments
                .add_staff_member(department.id, head.id, "Department Head".to_string())
                .await?;
            users.set_department(head.id, Some(department.id)).await?;
        }
        println!("   Created department: {}", department.name);
        created_departments.push(department);
    }

    println!("Creating complaints...");
    let complaint_count = sample_complaints().len();
    for (index, sample) in sample_complaints().into_iter().enumerate() {
        let Some(department) = created_departments
            .iter()
            .find(|department| department.handles_category(sample.category))
        else {
            println!("   Skipped complaint without department: {}", sample.title);
            continue;
        };
        let submitter = citizens[index % citizens.len()];

        let complaint = complaints
            .create(NewComplaint {
                title: sample.title.to_string(),
                description: sample.description.to_string(),
                category: sample.category,
                priority: sample.priority,
                is_emergency: sample.is_emergency,
                location: GeoPoint::new(sample.lat, sample.lng),
                address: sample.address.to_string(),
                city: Some("New York".to_string()),
                region: Some("NY".to_string()),
                submitted_by: submitter.id,
                department_id: department.id,
            })
            .await?;
        departments.increment_total_handled(department.id).await?;

        // 緊急案件は未割り当てのまま残す
        if !sample.is_emergency && !providers.is_empty() {
            let provider = providers[index % providers.len()];
            if let Some(assigned) = complaints.assign(complaint.id, provider.id).await? {
                let mut active: ComplaintActiveModel = assigned.into();
                active.status = Set(ComplaintStatus::InProgress.as_str().to_string());
                complaints.save(active).await?;
            }
        }
        println!("   Created complaint: {}", complaint.title);
    }

    println!();
    println!("Database seeded successfully!");
    println!("   Users: {}", created_users.len());
    println!("   Departments: {}", created_departments.len());
    println!("   Complaints: {}", complaint_count);

    // 認証は外部サービスが担うため、動作確認用のトークンを発行して表示する
    let jwt = JwtManager::new(config.jwt.clone())?;
    println!();
    println!("Access tokens:");
    for user in &created_users {
        let token = jwt.generate_access_token(user.id, user.role())?;
        println!("   {} <{}> [{}]", user.name, user.email, user.role);
        println!("      {}", token);
    }

    Ok(())
}
