//! Minijinja rendering of the alert email.
//!
//! The body template is registered under an `.html` name so minijinja
//! auto-escapes every interpolated posting field.

use minijinja::Environment;
use serde::Serialize;

use joby_core::RawJobRecord;

use crate::alert::JobAlert;
use crate::traits::{Notification, NotifyError};

const BODY_TEMPLATE_NAME: &str = "job_alert.html";

const BODY_TEMPLATE: &str = r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #ff6600;">Hello {{ user_name }}!</h2>
  <p>We found <strong>{{ count }}</strong> new jobs matching your "{{ title }}" alert:</p>
  {% for job in jobs %}
  <div style="margin-bottom: 20px; padding: 15px; border: 1px solid #ddd; border-radius: 5px;">
    <h3 style="margin: 0 0 10px 0; color: #333;">{{ job.title }}</h3>
    <p style="margin: 5px 0;"><strong>Company:</strong> {{ job.company }}</p>
    <p style="margin: 5px 0;"><strong>Location:</strong> {{ job.location }}</p>
    <p style="margin: 5px 0;"><strong>Job Type:</strong> {{ job.job_type }}</p>
    <p style="margin: 5px 0;">
      <a href="{{ job.link }}" style="color: #ff6600; text-decoration: none; font-weight: bold;">View Job &rarr;</a>
    </p>
  </div>
  {% endfor %}
  <hr style="margin: 30px 0; border: none; border-top: 1px solid #ddd;" />
  <p style="color: #666; font-size: 14px;">
    This is your {{ frequency }} job alert from <strong>Joby</strong>.
    <br />
    Manage your notifications at any time from your dashboard.
  </p>
</body>
</html>
"#;

const MISSING: &str = "N/A";

/// One posting as shown in the email.
#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub link: String,
}

impl From<&RawJobRecord> for JobCard {
    fn from(record: &RawJobRecord) -> Self {
        let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());
        Self {
            title: or_missing(&record.title),
            company: or_missing(&record.company),
            location: or_missing(&record.location),
            job_type: or_missing(&record.job_type),
            link: record.link().unwrap_or("#").to_string(),
        }
    }
}

/// Context data available to the body template.
#[derive(Debug, Clone, Serialize)]
pub struct AlertContext {
    pub user_name: String,
    pub title: String,
    pub frequency: String,
    pub count: usize,
    pub jobs: Vec<JobCard>,
}

impl AlertContext {
    pub fn new(alert: &JobAlert, jobs: &[RawJobRecord]) -> Self {
        Self {
            user_name: alert.subscriber.display_name().to_string(),
            title: alert.title.clone(),
            frequency: alert.frequency.as_str().to_string(),
            count: jobs.len(),
            jobs: jobs.iter().map(JobCard::from).collect(),
        }
    }
}

/// Renders alert emails. The environment is built once and reused.
#[derive(Debug)]
pub struct AlertRenderer {
    env: Environment<'static>,
}

impl AlertRenderer {
    pub fn new() -> Result<Self, NotifyError> {
        let mut env = Environment::new();
        env.add_template(BODY_TEMPLATE_NAME, BODY_TEMPLATE)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(Self { env })
    }

    pub fn subject(alert: &JobAlert, count: usize) -> String {
        format!("Joby: {} New {} Jobs", count, alert.title)
    }

    pub fn render_body(&self, ctx: &AlertContext) -> Result<String, NotifyError> {
        self.env
            .get_template(BODY_TEMPLATE_NAME)
            .and_then(|tpl| tpl.render(ctx))
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Build the email for an alert and the postings found for it.
    pub fn render(
        &self,
        alert: &JobAlert,
        jobs: &[RawJobRecord],
    ) -> Result<Notification, NotifyError> {
        let ctx = AlertContext::new(alert, jobs);
        Ok(Notification {
            recipient: alert.subscriber.email.clone(),
            subject: Self::subject(alert, jobs.len()),
            body: self.render_body(&ctx)?,
        })
    }
}
