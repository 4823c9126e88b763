use anyhow::{Result, bail};
use std::process;

use caltrack_core::error::{TrackerError, tracker_error};
use caltrack_core::models::{ActivityLevel, Gender, NewUser, User};
use caltrack_core::nutrition::calculate_bmr;
use caltrack_core::service::TrackerService;
use caltrack_core::session::Session;

use super::helpers::json_error;

/// Optional profile edits; `None` keeps the current value.
pub(crate) struct ProfileChanges {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<String>,
    pub activity: Option<String>,
}

impl ProfileChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.gender.is_none()
            && self.activity.is_none()
    }

    fn apply(self, user: &User) -> Result<User> {
        let mut updated = user.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(age) = self.age {
            updated.age = age;
        }
        if let Some(weight) = self.weight {
            updated.weight = weight;
        }
        if let Some(height) = self.height {
            updated.height = height;
        }
        if let Some(gender) = self.gender {
            updated.gender = gender.parse()?;
        }
        if let Some(activity) = self.activity {
            updated.activity_level = activity.parse()?;
        }
        Ok(updated)
    }
}

fn print_profile(user: &User) {
    let bmr = calculate_bmr(user.weight, user.height, user.age, user.gender);
    println!("=== {} <{}> ===", user.name, user.email);
    println!("  Age:       {}", user.age);
    println!("  Weight:    {:.1} kg", user.weight);
    println!("  Height:    {:.0} cm", user.height);
    println!("  Gender:    {}", user.gender);
    println!("  Activity:  {}", user.activity_level.description());
    println!("  BMR:       {bmr:.0} kcal");
    println!("  Daily goal: {} kcal", user.daily_calorie_goal);
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_signup(
    svc: &TrackerService,
    session: &mut Session,
    name: &str,
    email: &str,
    age: u32,
    weight: f64,
    height: f64,
    gender: &str,
    activity: &str,
    json: bool,
) -> Result<()> {
    let new_user = NewUser {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        age,
        weight,
        height,
        gender: gender.parse::<Gender>()?,
        activity_level: activity.parse::<ActivityLevel>()?,
    };

    let user = session.signup(svc, new_user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!(
            "Welcome, {}! Your daily calorie goal is {} kcal.",
            user.name, user.daily_calorie_goal
        );
    }

    Ok(())
}

pub(crate) fn cmd_login(
    svc: &TrackerService,
    session: &mut Session,
    email: &str,
    json: bool,
) -> Result<()> {
    match session.login(svc, email) {
        Ok(user) => {
            if json {
                println!("{}", serde_json::to_string_pretty(user)?);
            } else {
                println!("Logged in as {} <{}>", user.name, user.email);
            }
            Ok(())
        }
        Err(e) if matches!(tracker_error(&e), Some(TrackerError::UserNotFound(_))) => {
            let message = format!("No account for '{}'. Run `caltrack signup` first", email.trim());
            if json {
                println!("{}", json_error(&message));
            } else {
                eprintln!("{message}");
            }
            process::exit(2);
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn cmd_logout(svc: &TrackerService, session: &mut Session, json: bool) -> Result<()> {
    let email = session.current_user().map(|u| u.email.clone());
    session.logout(svc)?;

    if json {
        println!("{}", serde_json::json!({ "loggedOut": email }));
    } else if let Some(email) = email {
        println!("Logged out {email}");
    } else {
        println!("Not logged in");
    }

    Ok(())
}

pub(crate) fn cmd_profile_show(session: &Session, json: bool) -> Result<()> {
    let user = session.require_user()?;
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        print_profile(user);
    }
    Ok(())
}

pub(crate) fn cmd_profile_update(
    svc: &TrackerService,
    session: &mut Session,
    changes: ProfileChanges,
    json: bool,
) -> Result<()> {
    if changes.is_empty() {
        bail!(
            "Nothing to update. Provide at least one of --name, --age, --weight, --height, --gender or --activity"
        );
    }

    let current = session.require_user()?.clone();
    let updated = changes.apply(&current)?;
    let saved = session.update_profile(svc, &updated)?;

    if json {
        println!("{}", serde_json::to_string_pretty(saved)?);
    } else {
        let old_goal = current.daily_calorie_goal;
        let new_goal = saved.daily_calorie_goal;
        println!("Profile updated. Daily goal: {old_goal} -> {new_goal} kcal");
    }

    Ok(())
}
