use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use ntex::http::StatusCode;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info, warn};

use crate::config::Config;
use crate::contact::mailbox::{Mailbox, MailboxHandler, MailboxSender};
use crate::contact::{ContactForm, FieldErrors, Submission};
use crate::query_string::QueryString;
use crate::site::{now, Site};

pub struct AppState {
    pub site: Site,
    pub mailbox: MailboxSender,
}

type SharedState = web::types::State<Arc<Mutex<AppState>>>;

/// A panic while rendering must not take every later request down with it.
fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn html(status: StatusCode, body: String) -> web::HttpResponse {
    web::HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Turns a rendered page into a response. The error kind picks the status: missing things
/// get the not found page, bad parameters a 400, anything else a 500.
fn respond(site: &Site, path: &str, rendered: io::Result<String>) -> web::HttpResponse {
    match rendered {
        Ok(body) => html(StatusCode::OK, body),
        Err(e) if e.kind() == ErrorKind::NotFound => not_found_response(site, path),
        Err(e) if e.kind() == ErrorKind::InvalidInput => {
            warn!("Bad request {}: {}", path, e);
            web::HttpResponse::BadRequest()
                .content_type("text/plain; charset=utf-8")
                .body(format!("Bad request: {}", e))
        }
        Err(e) => {
            error!("Error rendering {}: {}", path, e);
            web::HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body("Internal server error")
        }
    }
}

fn not_found_response(site: &Site, path: &str) -> web::HttpResponse {
    match site.not_found_page(path, now()) {
        Ok(body) => html(StatusCode::NOT_FOUND, body),
        Err(e) => {
            error!("Error rendering not found page: {}", e);
            web::HttpResponse::NotFound().body("Not found")
        }
    }
}

fn query(req: &HttpRequest) -> QueryString {
    QueryString::from_opt(req.uri().query())
}

fn file_response(path: io::Result<PathBuf>) -> Result<NamedFile, web::Error> {
    match path {
        Ok(path) => Ok(NamedFile::open(path)?),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(web::error::ErrorForbidden("Access forbidden").into()),
        Err(e) => Err(web::error::ErrorNotFound(e.to_string()).into()),
    }
}

fn redirect(location: String) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", location)
        .content_type("text/html; charset=utf-8")
        .finish()
}

// Begin: Redirect region --------
#[web::get("/about")]
async fn about_wo_slash() -> web::HttpResponse {
    redirect("/about/".to_string())
}

#[web::get("/contact")]
async fn contact_wo_slash() -> web::HttpResponse {
    redirect("/contact/".to_string())
}

#[web::get("/datalogs")]
async fn datalogs_wo_slash() -> web::HttpResponse {
    redirect("/datalogs/".to_string())
}

#[web::get("/systems")]
async fn systems_wo_slash() -> web::HttpResponse {
    redirect("/systems/".to_string())
}

#[web::get("/page/{name}")]
async fn page_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    redirect(format!("/page/{}/", path.into_inner()))
}

#[web::get("/datalogs/{slug}")]
async fn datalog_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    redirect(format!("/datalogs/{}/", path.into_inner()))
}

/// `/datalogs/category/x`, `/datalogs/tag/x`, `/datalogs/series/x` and `/datalogs/archive/2024`.
#[web::get("/datalogs/{kind:category|tag|series|archive}/{value}")]
async fn datalog_group_wo_slash(path: web::types::Path<(String, String)>) -> web::HttpResponse {
    let (kind, value) = path.into_inner();
    redirect(format!("/datalogs/{}/{}/", kind, value))
}

#[web::get("/datalogs/archive/{year}/{month}")]
async fn archive_month_wo_slash(path: web::types::Path<(String, String)>) -> web::HttpResponse {
    let (year, month) = path.into_inner();
    redirect(format!("/datalogs/archive/{}/{}/", year, month))
}

#[web::get("/systems/{slug}")]
async fn system_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    redirect(format!("/systems/{}/", path.into_inner()))
}
// End: Redirect region --------

#[web::get("/")]
async fn index(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    respond(&state.site, "/", state.site.home(now()))
}

#[web::get("/about/")]
async fn about(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    respond(&state.site, "/about/", state.site.about(now()))
}

#[web::get("/contact/")]
async fn contact(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let sent = query(&req).has("sent");
    let state = lock(&state);
    respond(&state.site, "/contact/", state.site.contact(&ContactForm::default(), &FieldErrors::new(), sent, now()))
}

#[web::post("/contact/")]
async fn contact_submit(form: web::types::Form<ContactForm>, state: SharedState) -> web::HttpResponse {
    let message = match form.into_inner().submit() {
        Submission::Accepted(message) => message,
        Submission::Discarded => {
            info!("Contact form honeypot filled, message discarded");
            return web::HttpResponse::SeeOther().header("Location", "/contact/?sent=1").finish();
        }
        Submission::Rejected(form, errors) => {
            let state = lock(&state);
            return match state.site.contact(&form, &errors, false, now()) {
                Ok(body) => html(StatusCode::BAD_REQUEST, body),
                Err(e) => respond(&state.site, "/contact/", Err(e)),
            };
        }
    };

    info!("Contact message {} received from {}", message.id, message.email);
    let mailbox = lock(&state).mailbox.clone();
    mailbox.deliver(message).await;

    web::HttpResponse::SeeOther()
        .header("Location", "/contact/?sent=1")
        .finish()
}

#[web::get("/page/{name}/")]
async fn page_view(path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let name = path.into_inner();
    let state = lock(&state);
    respond(&state.site, &format!("/page/{}/", name), state.site.page(&name, now()))
}

#[web::get("/page/{name}/{file}")]
async fn page_files(path: web::types::Path<(String, String)>, state: SharedState) -> Result<NamedFile, web::Error> {
    let (name, file) = path.into_inner();
    let state = lock(&state);
    file_response(state.site.page_asset(&name, &file))
}

#[web::get("/datalogs/")]
async fn datalogs(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let qs = query(&req);
    let state = lock(&state);
    respond(&state.site, "/datalogs/", state.site.datalog_list(qs.get_page(), qs.get("q"), now()))
}

#[web::get("/datalogs/feed.xml")]
async fn feed(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    match state.site.feed(now()) {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(xml),
        Err(e) => respond(&state.site, "/datalogs/feed.xml", Err(e)),
    }
}

#[web::get("/datalogs/categories/")]
async fn categories(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    respond(&state.site, "/datalogs/categories/", state.site.categories(now()))
}

#[web::get("/datalogs/category/{slug}/")]
async fn category(req: HttpRequest, path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let slug = path.into_inner();
    let page = query(&req).get_page();
    let state = lock(&state);
    respond(&state.site, req.path(), state.site.category(&slug, page, now()))
}

#[web::get("/datalogs/tag/{slug}/")]
async fn tag(req: HttpRequest, path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let slug = path.into_inner();
    let page = query(&req).get_page();
    let state = lock(&state);
    respond(&state.site, req.path(), state.site.tag(&slug, page, now()))
}

#[web::get("/datalogs/series/{slug}/")]
async fn series(req: HttpRequest, path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let slug = path.into_inner();
    let state = lock(&state);
    respond(&state.site, req.path(), state.site.series(&slug, now()))
}

#[web::get("/datalogs/archive/")]
async fn archive(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    respond(&state.site, "/datalogs/archive/", state.site.archive(None, None, now()))
}

#[web::get("/datalogs/archive/{year}/")]
async fn archive_year(req: HttpRequest, path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    let Ok(year) = path.parse::<i32>() else {
        return not_found_response(&state.site, req.path());
    };
    respond(&state.site, req.path(), state.site.archive(Some(year), None, now()))
}

#[web::get("/datalogs/archive/{year}/{month}/")]
async fn archive_month(req: HttpRequest, path: web::types::Path<(String, String)>, state: SharedState) -> web::HttpResponse {
    let (year, month) = path.into_inner();
    let state = lock(&state);
    let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) else {
        return not_found_response(&state.site, req.path());
    };
    respond(&state.site, req.path(), state.site.archive(Some(year), Some(month), now()))
}

#[web::get("/datalogs/{slug}/")]
async fn datalog(req: HttpRequest, path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let slug = path.into_inner();
    let state = lock(&state);
    respond(&state.site, req.path(), state.site.datalog(&slug, now()))
}

#[web::get("/datalogs/{slug}/{file}")]
async fn datalog_files(path: web::types::Path<(String, String)>, state: SharedState) -> Result<NamedFile, web::Error> {
    let (slug, file) = path.into_inner();
    let state = lock(&state);
    file_response(state.site.datalog_asset(&slug, &file, now()))
}

#[web::get("/systems/")]
async fn systems(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let qs = query(&req);
    let state = lock(&state);
    respond(&state.site, "/systems/", state.site.system_list(qs.get("tech"), qs.get("stage"), qs.get_page(), now()))
}

#[web::get("/systems/{slug}/")]
async fn system(req: HttpRequest, path: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let slug = path.into_inner();
    let state = lock(&state);
    respond(&state.site, req.path(), state.site.system(&slug, now()))
}

#[web::get("/systems/{slug}/{file}")]
async fn system_files(path: web::types::Path<(String, String)>, state: SharedState) -> Result<NamedFile, web::Error> {
    let (slug, file) = path.into_inner();
    let state = lock(&state);
    file_response(state.site.system_asset(&slug, &file))
}

#[web::get("/theme.css")]
async fn theme_css(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    web::HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(state.site.theme_css())
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: SharedState) -> Result<NamedFile, web::Error> {
    let state = lock(&state);
    file_response(state.site.public_file(&path.into_inner()))
}

#[web::get("/{tail}*")]
async fn fallback(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    not_found_response(&state.site, req.path())
}

/// Every route. Literal paths come before the ones with placeholders, the fallback last.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(about)
        .service(about_wo_slash)
        .service(contact)
        .service(contact_submit)
        .service(contact_wo_slash)
        .service(page_view)
        .service(page_wo_slash)
        .service(page_files)
        .service(datalogs)
        .service(datalogs_wo_slash)
        .service(feed)
        .service(categories)
        .service(category)
        .service(tag)
        .service(series)
        .service(archive)
        .service(archive_year)
        .service(archive_month)
        .service(archive_month_wo_slash)
        .service(datalog_group_wo_slash)
        .service(datalog)
        .service(datalog_wo_slash)
        .service(datalog_files)
        .service(systems)
        .service(systems_wo_slash)
        .service(system)
        .service(system_wo_slash)
        .service(system_files)
        .service(theme_css)
        .service(public_files)
        .service(fallback);
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let mailbox_handler = match config.paths.messages_dir {
        Some(ref dir) => {
            info!("Contact messages go to {}", dir.display());
            Some(MailboxHandler::new(Mailbox::new(dir)?))
        }
        None => {
            warn!("No messages_dir configured, contact messages will be dropped");
            None
        }
    };
    let mailbox = mailbox_handler.as_ref().map_or_else(MailboxHandler::no_op, |h| h.new_sender());

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let site = Site::load(config)?;
    info!("Listening on {}:{}", bind_addr, bind_port);

    let app_state = Arc::new(Mutex::new(AppState { site, mailbox }));

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .configure(routes)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
