use crate::{
    api::{attendance, employee, leave_request, payroll, salary_structure, settings},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-scope limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let api_limiter = build_limiter(config.rate_api_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee)),
                    )
                    // /employees/{id}/deactivate
                    .service(
                        web::resource("/{id}/deactivate")
                            .route(web::put().to(employee::deactivate_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    // /attendance/reconcile
                    .service(
                        web::resource("/reconcile")
                            .route(web::post().to(attendance::reconcile_attendance)),
                    ),
            )
            .service(
                web::scope("/salary-structures")
                    // /salary-structures
                    .service(
                        web::resource("")
                            .route(web::post().to(salary_structure::create_structure))
                            .route(web::get().to(salary_structure::list_structures)),
                    )
                    // /salary-structures/applicable
                    .service(
                        web::resource("/applicable")
                            .route(web::get().to(salary_structure::get_applicable)),
                    )
                    // /salary-structures/derive
                    .service(
                        web::resource("/derive")
                            .route(web::post().to(salary_structure::derive_components)),
                    )
                    // /salary-structures/recompute
                    .service(
                        web::resource("/recompute")
                            .route(web::post().to(salary_structure::recompute_components)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll/runs
                    .service(
                        web::resource("/runs")
                            .route(web::post().to(payroll::create_payrun))
                            .route(web::get().to(payroll::list_payruns)),
                    )
                    // /payroll/runs/{id}
                    .service(web::resource("/runs/{id}").route(web::get().to(payroll::get_payrun)))
                    // /payroll/runs/{id}/process
                    .service(
                        web::resource("/runs/{id}/process")
                            .route(web::post().to(payroll::process_payrun)),
                    )
                    // /payroll/runs/{id}/validate
                    .service(
                        web::resource("/runs/{id}/validate")
                            .route(web::put().to(payroll::validate_payrun)),
                    )
                    // /payroll/runs/{id}/payslips
                    .service(
                        web::resource("/runs/{id}/payslips")
                            .route(web::get().to(payroll::list_payslips)),
                    ),
            )
            .service(
                web::scope("/payslips")
                    // /payslips/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payslip))
                            .route(web::put().to(payroll::update_payslip)),
                    ),
            )
            .service(
                web::scope("/settings")
                    // /settings/payroll
                    .service(
                        web::resource("/payroll")
                            .route(web::get().to(settings::get_settings))
                            .route(web::put().to(settings::update_settings)),
                    ),
            ),
    );
}
