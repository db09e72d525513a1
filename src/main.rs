use std::io::{self, Write as _};
use std::sync::Arc;

use rust_decimal::Decimal;

use sondae::analytics::{Analytics, TracingSink};
use sondae::auth::{AuthProvider, MemoryAuth};
use sondae::backend::{MemoryBackend, ProfileBackend, RestBackend};
use sondae::config::AppConfig;
use sondae::membership::{MembershipFlow, MembershipStash, OnboardingRoute, catalog};
use sondae::onboarding::{
    Availability, Experience, FlowDeps, FormPatch, Location, OnboardingFlow, OnboardingStep,
    OrgCategory, OrgSize, Preferences, Pricing, ProfileSubmitter, SocialLinks, StepOutcome,
    UserType,
};
use sondae::storage::FileStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("🍨 Sondae v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Storage: {}", config.storage_path.display());
    eprintln!(
        "   Analytics: {}",
        if config.analytics_enabled { "on" } else { "off" }
    );

    let storage = Arc::new(FileStorage::open(&config.storage_path).unwrap_or_else(|e| {
        eprintln!(
            "Error: Failed to open client storage at {}: {}",
            config.storage_path.display(),
            e
        );
        std::process::exit(1);
    }));

    let backend: Arc<dyn ProfileBackend> = match &config.backend_url {
        Some(url) => {
            eprintln!("   Backend: {}", url);
            Arc::new(RestBackend::new(url.clone()))
        }
        None => {
            eprintln!("   Backend: in-memory (set SONDAE_BACKEND_URL to go live)");
            Arc::new(MemoryBackend::new())
        }
    };

    let analytics = Analytics::with_enabled(Arc::new(TracingSink), config.analytics_enabled);
    let auth: Arc<dyn AuthProvider> = Arc::new(MemoryAuth::new());
    let stash = MembershipStash::new(storage, config.stash_max_age);

    eprintln!("   Answer the prompts. /quit exits.\n");

    // ── Membership selection ─────────────────────────────────────────────
    eprintln!("Memberships:");
    for plan in catalog() {
        let marker = if plan.highlighted { "★" } else { " " };
        eprintln!(
            " {} {} ({}) — {}{}",
            marker,
            plan.name(),
            plan.tier,
            plan.price_display(),
            plan.period
        );
        for feature in plan.features {
            eprintln!("      · {feature}");
        }
    }

    let membership = MembershipFlow::new(stash.clone(), Arc::clone(&auth), analytics.clone());
    let (selection, route) = loop {
        let choice = prompt("Choose a membership (free-jawn, pow-wow, tribe)")?;
        if choice == "/quit" {
            return Ok(());
        }
        match membership.select(&choice, "cli").await {
            Ok(outcome) => break outcome,
            Err(e) => eprintln!("   {e}"),
        }
    };
    eprintln!("   Next stop: {route}");

    // Paid checkout would create the account; the demo mints a throwaway one.
    if auth.current_user().is_none() {
        let user = auth.sign_up_anonymous().await?;
        eprintln!("   Session: {} (anonymous)", user.id);
    }

    // ── Onboarding ───────────────────────────────────────────────────────
    let preselected = match route {
        OnboardingRoute::Free => Some(UserType::Individual),
        OnboardingRoute::Paid => None,
    };
    let deps = FlowDeps {
        stash,
        submitter: ProfileSubmitter::new(Arc::clone(&auth), backend, analytics.clone()),
        analytics,
    };
    let mut flow = OnboardingFlow::start(selection, preselected, deps);
    flow.on_complete(|receipt| {
        eprintln!(
            "\n🎉 Welcome! Profile saved for {} ({} member).",
            receipt.user_id, receipt.membership_tier
        );
    });

    while !flow.is_complete() {
        let step = flow.current_step();
        eprintln!(
            "\n── Step {} of {}: {} ──",
            flow.step_index() + 1,
            flow.step_count(),
            step
        );
        collect_step(&mut flow)?;

        match flow.advance().await? {
            StepOutcome::Advanced(_) => {}
            StepOutcome::Rejected(errors) => {
                eprintln!("   Please fix:");
                for (path, messages) in errors.fields() {
                    if let Some(first) = messages.first() {
                        eprintln!("     {path}: {first}");
                    }
                }
                let cmd = prompt("Press Enter to re-enter the step, /back, or /quit")?;
                match cmd.as_str() {
                    "/back" => {
                        if let Err(e) = flow.back() {
                            eprintln!("   {e}");
                        }
                    }
                    "/quit" => return Ok(()),
                    _ => {}
                }
            }
            StepOutcome::Completed(_) => break,
            StepOutcome::Failed(message) => {
                eprintln!("   Submission failed: {message}");
                let cmd = prompt("Press Enter to retry, or /quit")?;
                if cmd == "/quit" {
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}

fn collect_step(flow: &mut OnboardingFlow) -> io::Result<()> {
    match flow.current_step() {
        OnboardingStep::Type => collect_type(flow),
        OnboardingStep::BasicInfo => collect_basic_info(flow),
        OnboardingStep::Details => collect_details(flow),
        OnboardingStep::Interests => collect_interests(flow),
        OnboardingStep::Preferences => collect_preferences(flow),
        OnboardingStep::Complete => Ok(()),
    }
}

fn collect_type(flow: &mut OnboardingFlow) -> io::Result<()> {
    for (i, user_type) in UserType::ALL.iter().enumerate() {
        eprintln!("   {}. {} — {}", i + 1, user_type.title(), user_type.description());
    }
    if let Some(i) = read_index("Pick 1-3", UserType::ALL.len())? {
        if let Err(e) = flow.select_user_type(UserType::ALL[i]) {
            eprintln!("   {e}");
        }
    }
    Ok(())
}

fn collect_basic_info(flow: &mut OnboardingFlow) -> io::Result<()> {
    let mut patch = FormPatch {
        name: Some(prompt("Name")?),
        email: Some(prompt("Email")?),
        location: Some(Location {
            city: prompt("City")?,
            state: prompt("State")?,
            country: prompt("Country")?,
        }),
        ..Default::default()
    };
    // Short plans have no details step, so the bio is asked for here.
    if !flow.plan().includes(OnboardingStep::Details) {
        patch.bio = Some(prompt("Bio (at least 50 characters)")?);
    }
    flow.store().update(patch);
    Ok(())
}

fn collect_details(flow: &mut OnboardingFlow) -> io::Result<()> {
    let patch = match flow.user_type() {
        Some(UserType::Individual) => FormPatch {
            bio: Some(prompt("Bio (at least 50 characters)")?),
            social_links: Some(SocialLinks {
                instagram: prompt("Instagram URL (optional)")?,
                twitter: prompt("Twitter URL (optional)")?,
                linkedin: prompt("LinkedIn URL (optional)")?,
                facebook: String::new(),
            }),
            ..Default::default()
        },
        Some(UserType::Organization) => {
            let organization = prompt("Organization name")?;
            let website = prompt("Website URL")?;
            let bio = prompt("Description (at least 100 characters)")?;
            for (i, category) in OrgCategory::ALL.iter().enumerate() {
                eprintln!("   {}. {category}", i + 1);
            }
            let organization_type =
                read_index("Organization type", OrgCategory::ALL.len())?.map(|i| OrgCategory::ALL[i]);
            let founded_year = prompt("Founded year")?.parse::<i32>().ok();
            for (i, size) in OrgSize::ALL.iter().enumerate() {
                eprintln!("   {}. {}", i + 1, size.label());
            }
            let size = read_index("Organization size", OrgSize::ALL.len())?.map(|i| OrgSize::ALL[i]);
            FormPatch {
                organization: Some(organization),
                website: Some(website),
                bio: Some(bio),
                organization_type: Some(organization_type),
                founded_year,
                size: Some(size),
                tax_id: Some(prompt("Tax ID (optional)")?),
                social_links: Some(SocialLinks {
                    facebook: prompt("Facebook URL (optional)")?,
                    instagram: prompt("Instagram URL (optional)")?,
                    linkedin: prompt("LinkedIn URL (optional)")?,
                    twitter: String::new(),
                }),
                ..Default::default()
            }
        }
        Some(UserType::Teacher) => FormPatch {
            bio: Some(prompt("Bio (at least 100 characters)")?),
            expertise: Some(read_list("Areas of expertise (comma-separated)")?),
            teaching_style: Some(read_list("Teaching styles (comma-separated)")?),
            experience: Some(Experience {
                years: prompt("Years of experience")?.parse().unwrap_or(0),
                certifications: Vec::new(),
                languages: read_list("Languages (comma-separated)")?,
            }),
            availability: Some(Availability {
                weekdays: yes_no("Available weekdays?", true)?,
                weekends: yes_no("Available weekends?", true)?,
                evenings: yes_no("Available evenings?", false)?,
                mornings: yes_no("Available mornings?", false)?,
            }),
            pricing: Some(Pricing {
                hourly_rate: read_decimal("Hourly rate (USD)")?,
                group_rate: read_decimal("Group rate (USD)")?,
                currency: "USD".to_string(),
            }),
            ..Default::default()
        },
        // No persona picked yet; advancing will point that out.
        None => return Ok(()),
    };
    flow.store().update(patch);
    Ok(())
}

fn collect_interests(flow: &mut OnboardingFlow) -> io::Result<()> {
    flow.store().update(FormPatch {
        interests: Some(read_list("Interests (comma-separated, at least 2)")?),
        ..Default::default()
    });
    Ok(())
}

fn collect_preferences(flow: &mut OnboardingFlow) -> io::Result<()> {
    flow.store().update(FormPatch {
        preferences: Some(Preferences {
            event_notifications: yes_no("Event notifications?", true)?,
            newsletter_subscription: yes_no("Newsletter?", true)?,
            private_profile: yes_no("Keep profile private?", false)?,
        }),
        ..Default::default()
    });
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn read_list(label: &str) -> io::Result<Vec<String>> {
    Ok(prompt(label)?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn read_index(label: &str, len: usize) -> io::Result<Option<usize>> {
    let value = prompt(label)?;
    Ok(value
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|i| *i < len))
}

fn read_decimal(label: &str) -> io::Result<Decimal> {
    Ok(prompt(label)?.parse().unwrap_or(Decimal::ZERO))
}

fn yes_no(label: &str, default: bool) -> io::Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    let value = prompt(&format!("{label} [{hint}]"))?;
    Ok(match value.to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}
