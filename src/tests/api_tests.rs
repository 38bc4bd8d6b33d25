#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use crate::config::DeletePolicy;
    use crate::forms::{INVALID_CHOICE, INVALID_DECIMAL, REQUIRED};
    use crate::store;
    use crate::tests::{assert_redirect, body_bytes, body_text, setup_app, TestApp};
    use crate::types::PaymentStatus;

    async fn add_student(t: &TestApp, name: &str, email: &str) {
        let res = t
            .post_form("/university/students/add", &[("name", name), ("email", email), ("major", "Physics")])
            .await;
        assert_redirect(&res, "/university/students");
    }

    async fn add_professor(t: &TestApp, name: &str, email: &str) {
        let res = t
            .post_form("/university/professors/add", &[("name", name), ("email", email), ("department", "Math")])
            .await;
        assert_redirect(&res, "/university/professors");
    }

    async fn student_ids(t: &TestApp) -> Vec<String> {
        let mut conn = t.state.db.acquire().await.unwrap();
        store::students::list(&mut conn).await.unwrap().into_iter().map(|s| s.id).collect()
    }

    #[tokio::test]
    async fn first_student_gets_s0001_and_is_listed() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_student(&t, "Ann", "ann%40u.edu").await;

        assert_eq!(student_ids(&t).await, vec!["s0001"]);
        let res = t.get("/university/students").await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Ann"));
        assert!(html.contains("ann@u.edu"));
        assert!(html.contains("/university/students/edit/s0001"));
    }

    #[tokio::test]
    async fn deleted_ids_are_not_handed_out_again() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_student(&t, "Ann", "ann%40u.edu").await;
        add_student(&t, "Bob", "bob%40u.edu").await;

        let res = t.get("/university/students/delete/s0002").await;
        assert_redirect(&res, "/university/students");
        add_student(&t, "Cid", "cid%40u.edu").await;

        assert_eq!(student_ids(&t).await, vec!["s0001", "s0003"]);
    }

    #[tokio::test]
    async fn professors_use_the_i_prefix() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_professor(&t, "Dr.+Smith", "smith%40u.edu").await;
        let html = body_text(t.get("/university/professors").await).await;
        assert!(html.contains("i0001"));
        assert!(html.contains("Dr. Smith"));
    }

    #[tokio::test]
    async fn invalid_form_is_rerendered_with_errors() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.post_form("/university/students/add", &[("name", "+++"), ("email", "x%40u.edu")]).await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains(REQUIRED));
        assert!(html.contains("x@u.edu"));
        assert!(student_ids(&t).await.is_empty());
    }

    #[tokio::test]
    async fn edit_overwrites_fields_in_place() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_student(&t, "Ann", "ann%40u.edu").await;

        let html = body_text(t.get("/university/students/edit/s0001").await).await;
        assert!(html.contains("value=\"Ann\""));

        let res = t
            .post_form("/university/students/edit/s0001", &[("name", "Anna"), ("email", "ann%40u.edu"), ("major", "Math")])
            .await;
        assert_redirect(&res, "/university/students");

        let mut conn = t.state.db.acquire().await.unwrap();
        let student = store::students::find(&mut conn, "s0001").await.unwrap();
        assert_eq!(student.name, "Anna");
        assert_eq!(student.major, "Math");
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let t = setup_app(DeletePolicy::Orphan).await;
        assert_eq!(t.get("/university/students/edit/s0099").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(t.get("/university/courses/delete/42").await.status(), StatusCode::NOT_FOUND);
        let res = t
            .post_form("/university/payments/edit/7", &[("student_id", "s0001"), ("amount_paid", "10")])
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_student(&t, "Ann", "ann%40u.edu").await;
        let res = t
            .post_form("/university/students/add", &[("name", "Other"), ("email", "ann%40u.edu"), ("major", "Art")])
            .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(student_ids(&t).await, vec!["s0001"]);
    }

    #[tokio::test]
    async fn course_form_rejects_unknown_professor() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_professor(&t, "Smith", "smith%40u.edu").await;

        let form = t.get("/university/courses/add").await;
        let html = body_text(form).await;
        assert!(html.contains("value=\"3\""));
        assert!(html.contains("<option value=\"i0001\""));

        let res = t
            .post_form(
                "/university/courses/add",
                &[("name", "Algebra"), ("code", "MA101"), ("credits", "4"), ("professor_id", "i0042")],
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains(INVALID_CHOICE));

        let res = t
            .post_form(
                "/university/courses/add",
                &[("name", "Algebra"), ("code", "MA101"), ("credits", "4"), ("professor_id", "i0001")],
            )
            .await;
        assert_redirect(&res, "/university/courses");
        let html = body_text(t.get("/university/courses").await).await;
        assert!(html.contains("MA101"));
    }

    #[tokio::test]
    async fn payment_form_records_amount_and_status() {
        let t = setup_app(DeletePolicy::Orphan).await;
        add_student(&t, "Ann", "ann%40u.edu").await;
        add_professor(&t, "Smith", "smith%40u.edu").await;
        t.post_form(
            "/university/courses/add",
            &[("name", "Algebra"), ("code", "MA101"), ("credits", "3"), ("professor_id", "i0001")],
        )
        .await;

        let html = body_text(t.get("/university/payments/add").await).await;
        assert!(html.contains("Algebra (MA101)"));

        let res = t
            .post_form(
                "/university/payments/add",
                &[("student_id", "s0001"), ("course_id", "1"), ("amount_paid", "250"), ("status", "pending")],
            )
            .await;
        assert_redirect(&res, "/university/payments");

        let mut conn = t.state.db.acquire().await.unwrap();
        let payments = store::payments::list(&mut conn).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_paid, 250.0);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn export_then_import_round_trips_students() {
        let source = setup_app(DeletePolicy::Orphan).await;
        add_student(&source, "Ann", "ann%40u.edu").await;
        add_student(&source, "Bob%2C+Jr.", "bob%40u.edu").await;

        let res = source.get("/university/students/export").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().starts_with("text/csv"));
        assert_eq!(
            res.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=students.csv"
        );
        let csv = body_bytes(res).await;
        let text = String::from_utf8(csv.clone()).unwrap();
        assert!(text.starts_with("ID,Name,Email,Major\r\n"));
        assert!(text.contains("s0002,\"Bob, Jr.\",bob@u.edu,Physics\r\n"));

        let target = setup_app(DeletePolicy::Orphan).await;
        let res = target.post_file("/university/students/import", "students.csv", &csv).await;
        assert_redirect(&res, "/university/students");
        assert_eq!(student_ids(&target).await, vec!["s0001", "s0002"]);

        // The allocator continues after imported ids.
        add_student(&target, "Cid", "cid%40u.edu").await;
        assert_eq!(student_ids(&target).await, vec!["s0001", "s0002", "s0003"]);
    }

    #[tokio::test]
    async fn export_then_import_round_trips_professors() {
        let source = setup_app(DeletePolicy::Orphan).await;
        add_professor(&source, "Smith", "smith%40u.edu").await;
        add_professor(&source, "O%27Neil%2C+Pat", "oneil%40u.edu").await;

        let res = source.get("/university/professors/export").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=professors.csv"
        );
        let csv = body_bytes(res).await;
        let text = String::from_utf8(csv.clone()).unwrap();
        assert!(text.starts_with("ID,Name,Email,Department\r\n"));
        assert!(text.contains("i0002,\"O'Neil, Pat\",oneil@u.edu,"));

        let target = setup_app(DeletePolicy::Orphan).await;
        let res = target.post_file("/university/professors/import", "professors.csv", &csv).await;
        assert_redirect(&res, "/university/professors");

        let mut conn = source.state.db.acquire().await.unwrap();
        let exported = store::professors::list(&mut conn).await.unwrap();
        drop(conn);
        let mut conn = target.state.db.acquire().await.unwrap();
        let imported = store::professors::list(&mut conn).await.unwrap();
        drop(conn);
        assert_eq!(imported, exported);

        add_professor(&target, "Lee", "lee%40u.edu").await;
        let mut conn = target.state.db.acquire().await.unwrap();
        let ids: Vec<String> = store::professors::list(&mut conn).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["i0001", "i0002", "i0003"]);
    }

    #[tokio::test]
    async fn export_then_import_round_trips_courses() {
        let source = setup_app(DeletePolicy::Orphan).await;
        add_professor(&source, "Smith", "smith%40u.edu").await;
        for (name, code, credits) in [("Algebra", "MA101", "3"), ("Linear+Algebra%2C+Part+II", "MA201", "4")] {
            let res = source
                .post_form(
                    "/university/courses/add",
                    &[("name", name), ("code", code), ("credits", credits), ("professor_id", "i0001")],
                )
                .await;
            assert_redirect(&res, "/university/courses");
        }

        let res = source.get("/university/courses/export").await;
        assert_eq!(res.status(), StatusCode::OK);
        let csv = body_bytes(res).await;
        let text = String::from_utf8(csv.clone()).unwrap();
        assert!(text.starts_with("ID,Name,Code,Credits,Professor ID\r\n"));
        assert!(text.contains("2,\"Linear Algebra, Part II\",MA201,4,i0001\r\n"));

        // Courses import on their own; the professor reference may dangle.
        let target = setup_app(DeletePolicy::Orphan).await;
        let res = target.post_file("/university/courses/import", "courses.csv", &csv).await;
        assert_redirect(&res, "/university/courses");

        let mut conn = source.state.db.acquire().await.unwrap();
        let exported = store::courses::list(&mut conn).await.unwrap();
        drop(conn);
        let mut conn = target.state.db.acquire().await.unwrap();
        let imported = store::courses::list(&mut conn).await.unwrap();
        drop(conn);
        assert_eq!(imported.len(), 2);
        assert_eq!(imported, exported);
    }

    #[tokio::test]
    async fn payment_edit_keeps_fractional_amount() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let csv = "ID,Name,Email,Major\ns0001,Ann,ann@u.edu,Physics\n";
        t.post_file("/university/students/import", "students.csv", csv.as_bytes()).await;
        let csv = "ID,Name,Code,Credits,Professor ID\n4,Algebra,MA101,3,i0001\n";
        t.post_file("/university/courses/import", "courses.csv", csv.as_bytes()).await;
        let csv = "ID,Student ID,Course ID,Amount Paid,Payment Date,Status\n7,s0001,4,60.5,,paid\n";
        let res = t.post_file("/university/payments/import", "payments.csv", csv.as_bytes()).await;
        assert_redirect(&res, "/university/payments");

        let html = body_text(t.get("/university/payments/edit/7").await).await;
        assert!(html.contains(r#"name="amount_paid" type="text" value="60.5""#));

        // Resubmit the pre-filled form unchanged.
        let res = t
            .post_form(
                "/university/payments/edit/7",
                &[("student_id", "s0001"), ("course_id", "4"), ("amount_paid", "60.5"), ("status", "paid")],
            )
            .await;
        assert_redirect(&res, "/university/payments");

        let mut conn = t.state.db.acquire().await.unwrap();
        let payment = store::payments::find(&mut conn, 7).await.unwrap();
        drop(conn);
        assert_eq!(payment.amount_paid, 60.5);

        let res = t
            .post_form(
                "/university/payments/edit/7",
                &[("student_id", "s0001"), ("course_id", "4"), ("amount_paid", "sixty"), ("status", "paid")],
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains(INVALID_DECIMAL));
    }

    #[tokio::test]
    async fn payment_import_fills_missing_date() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let csv = "ID,Student ID,Course ID,Amount Paid,Payment Date,Status\r\n7,s0004,4,60.0,,paid\r\n";
        let before = chrono::Local::now().naive_local();
        let res = t.post_file("/university/payments/import", "payments.csv", csv.as_bytes()).await;
        assert_redirect(&res, "/university/payments");

        let mut conn = t.state.db.acquire().await.unwrap();
        let payment = store::payments::find(&mut conn, 7).await.unwrap();
        drop(conn);
        assert_eq!(payment.student_id, "s0004");
        assert_eq!(payment.course_id, 4);
        assert_eq!(payment.amount_paid, 60.0);
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert!(payment.payment_date >= before - chrono::Duration::seconds(1));

        let text = body_text(t.get("/university/payments/export").await).await;
        assert!(text.contains("\r\n7,s0004,4,60.0,"));
        assert!(text.ends_with(",paid\r\n"));
    }

    #[tokio::test]
    async fn malformed_import_persists_nothing() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let csv = "ID,Name,Code,Credits,Professor ID\n1,Algebra,MA101,3,i0001\n2,Physics,PH101,three,i0001\n";
        let res = t.post_file("/university/courses/import", "courses.csv", csv.as_bytes()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(res).await.contains("Credits"));

        let mut conn = t.state.db.acquire().await.unwrap();
        assert!(store::courses::list(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_with_duplicate_key_rolls_back() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let csv = "ID,Student ID,Course ID,Grade\n1,s0001,1,A\n1,s0002,1,B\n";
        let res = t.post_file("/university/enrollments/import", "enrollments.csv", csv.as_bytes()).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let mut conn = t.state.db.acquire().await.unwrap();
        assert!(store::enrollments::list(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_rows_and_empty_grades_on_import() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let csv = "ID,Student ID,Course ID,Grade\n1,s0001,1,\n2,s0002\n3,s0003,2,B+\n";
        let res = t.post_file("/university/enrollments/import", "enrollments.csv", csv.as_bytes()).await;
        assert_redirect(&res, "/university/enrollments");

        let mut conn = t.state.db.acquire().await.unwrap();
        let enrollments = store::enrollments::list(&mut conn).await.unwrap();
        assert_eq!(enrollments.len(), 2);
        assert_eq!(enrollments[0].grade, None);
        assert_eq!(enrollments[1].grade.as_deref(), Some("B+"));
    }

    #[tokio::test]
    async fn empty_import_rerenders_upload_form() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.post_file("/university/students/import", "", b"").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains(REQUIRED));
    }

    #[tokio::test]
    async fn gallery_upload_overwrites_same_name() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.post_file("/university/gallery/upload/campus", "quad.jpg", b"first").await;
        assert_redirect(&res, "/university/gallery");
        let res = t.post_file("/university/gallery/upload/campus", "quad.jpg", b"second").await;
        assert_redirect(&res, "/university/gallery");

        let html = body_text(t.get("/university/gallery").await).await;
        assert_eq!(html.matches("/university/gallery/download/campus/quad.jpg").count(), 1);

        let res = t.get("/university/gallery/download/campus/quad.jpg").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/octet-stream");
        assert_eq!(res.headers().get(header::CONTENT_DISPOSITION).unwrap(), "attachment; filename=\"quad.jpg\"");
        assert_eq!(body_bytes(res).await, b"second");

        let res = t.get("/static/uploads/campus/quad.jpg").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(t.dir.path().join("uploads/campus/quad.jpg").is_file());
    }

    #[tokio::test]
    async fn gallery_accepts_double_dots_inside_a_filename() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.post_file("/university/gallery/upload/campus", "summer..2024.jpg", b"sun").await;
        assert_redirect(&res, "/university/gallery");
        assert!(t.dir.path().join("uploads/campus/summer..2024.jpg").is_file());

        let res = t.get("/university/gallery/download/campus/summer..2024.jpg").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_bytes(res).await, b"sun");
    }

    #[tokio::test]
    async fn gallery_upload_without_filename_changes_nothing() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.post_file("/university/gallery/upload/campus", "", b"data").await;
        assert_redirect(&res, "/university/gallery");
        assert!(!t.dir.path().join("uploads/campus").exists());
        assert_eq!(t.state.metrics.get_snapshot().files_uploaded, 0);
    }

    #[tokio::test]
    async fn gallery_rejects_paths_outside_the_root() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.get("/university/gallery/download/campus/missing.jpg").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = t.get("/university/gallery/download/campus/..%2Funiversity.db").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res = t.post_file("/university/gallery/upload/..", "x.jpg", b"x").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pages_carry_security_headers() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.get("/university").await;
        assert_eq!(res.status(), StatusCode::OK);
        let headers = res.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "SAMEORIGIN");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert!(body_text(res).await.contains("/university/students"));
    }

    #[tokio::test]
    async fn root_redirects_to_home() {
        let t = setup_app(DeletePolicy::Orphan).await;
        assert_redirect(&t.get("/").await, "/university");
    }

    #[tokio::test]
    async fn health_and_metrics_endpoints() {
        let t = setup_app(DeletePolicy::Orphan).await;
        let res = t.get("/healthz").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ok");
        assert_eq!(t.get("/readyz").await.status(), StatusCode::OK);

        add_student(&t, "Ann", "ann%40u.edu").await;
        t.get("/university/students/export").await;

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(t.get("/metrics").await).await).unwrap();
        assert_eq!(json["records_created"], 1);
        assert_eq!(json["rows_exported"], 1);

        let text = body_text(t.get("/metrics/prometheus").await).await;
        assert!(text.contains("university_records_created 1"));

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(t.get("/version").await).await).unwrap();
        assert_eq!(json["name"], "university-records");
    }
}
